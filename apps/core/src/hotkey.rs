use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::keys::Key;

const MODIFIER_ORDER: [Key; 4] = [Key::Ctrl, Key::Alt, Key::Shift, Key::Meta];

/// Logical action a global chord resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyAction {
    ToggleWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey is empty")]
    Empty,
    #[error("unsupported key '{key}' in hotkey '{hotkey}'")]
    UnknownKey { hotkey: String, key: String },
    #[error("hotkey '{0}' lists the same key twice")]
    DuplicateKey(String),
    #[error("hotkey '{0}' must include at least one modifier and one key")]
    MissingModifier(String),
    #[error("hotkey '{0}' is reserved by the operating system")]
    Reserved(String),
}

/// A set of keys that must all be held at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    keys: BTreeSet<Key>,
}

impl Chord {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    pub fn is_held(&self, held: &HashSet<Key>) -> bool {
        !self.keys.is_empty() && self.keys.iter().all(|key| held.contains(key))
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let modifiers = MODIFIER_ORDER.iter().filter(|m| self.keys.contains(*m));
        let others = self.keys.iter().filter(|key| !key.is_modifier());
        let parts: Vec<String> = modifiers.chain(others).map(Key::to_string).collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// Parses strings such as `"Meta+Alt+Space"` into a chord. Modifier aliases
/// (`cmd`, `option`, `control`, `super`, ...) are accepted in any case.
pub fn parse_chord(input: &str) -> Result<Chord, HotkeyError> {
    let parts: Vec<&str> = input
        .split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(HotkeyError::Empty);
    }

    let mut keys = BTreeSet::new();
    for part in &parts {
        let key: Key = part.parse().map_err(|_| HotkeyError::UnknownKey {
            hotkey: input.to_string(),
            key: part.to_string(),
        })?;
        if !keys.insert(key) {
            return Err(HotkeyError::DuplicateKey(input.to_string()));
        }
    }

    let has_modifier = keys.iter().any(Key::is_modifier);
    let has_key = keys.iter().any(|key| !key.is_modifier());
    if !has_modifier || !has_key {
        return Err(HotkeyError::MissingModifier(input.to_string()));
    }

    let chord = Chord { keys };
    if is_reserved(&chord) {
        return Err(HotkeyError::Reserved(chord.to_string()));
    }
    Ok(chord)
}

fn is_reserved(chord: &Chord) -> bool {
    matches!(
        chord.to_string().as_str(),
        "Alt+Tab" | "Alt+F4" | "Meta+Tab" | "Ctrl+Alt+Delete" | "Ctrl+Shift+Escape"
    )
}
