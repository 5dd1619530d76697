use std::collections::HashSet;

use crate::hotkey::Chord;
use crate::keys::{Key, KeyState, RawKeyEvent};

struct Binding<A> {
    chord: Chord,
    action: A,
    satisfied: bool,
}

/// Tracks held keys and reports chords as they become fully held.
///
/// Matching is edge-triggered: a chord fires once on the key-down that
/// completes it and stays silent until one of its keys is released. OS key
/// auto-repeat and unrelated keys pressed while the chord is held never
/// re-fire it. Each satisfied chord fires independently of the others.
///
/// Held keys are only forgotten on their own key-up. A release the OS never
/// delivers leaves that key stuck until it is pressed and released again.
pub struct ChordMatcher<A> {
    bindings: Vec<Binding<A>>,
    held: HashSet<Key>,
}

impl<A> Default for ChordMatcher<A> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            held: HashSet::new(),
        }
    }
}

impl<A: Clone> ChordMatcher<A> {
    pub fn new(bindings: impl IntoIterator<Item = (Chord, A)>) -> Self {
        let mut matcher = Self::default();
        for (chord, action) in bindings {
            matcher.register(chord, action);
        }
        matcher
    }

    pub fn register(&mut self, chord: Chord, action: A) {
        let satisfied = chord.is_held(&self.held);
        self.bindings.push(Binding {
            chord,
            action,
            satisfied,
        });
    }

    pub fn chord_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_held(&self, key: &Key) -> bool {
        self.held.contains(key)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Feeds one raw transition and returns the actions that fired on it.
    pub fn observe(&mut self, event: &RawKeyEvent) -> Vec<A> {
        match event.state {
            KeyState::Down => self.key_down(event.key.clone()),
            KeyState::Up => {
                self.key_up(&event.key);
                Vec::new()
            }
        }
    }

    pub fn key_down(&mut self, key: Key) -> Vec<A> {
        self.held.insert(key);

        let mut fired = Vec::new();
        for binding in &mut self.bindings {
            let now = binding.chord.is_held(&self.held);
            if now && !binding.satisfied {
                fired.push(binding.action.clone());
            }
            binding.satisfied = now;
        }
        fired
    }

    pub fn key_up(&mut self, key: &Key) {
        self.held.remove(key);
        for binding in &mut self.bindings {
            if binding.satisfied && binding.chord.contains(key) {
                binding.satisfied = false;
            }
        }
    }
}
