use tracing::debug;

use crate::view::View;

/// Stack of views whose top is the one on screen. The home view pushed at
/// construction is never removed, so the stack is never empty.
pub struct ViewStack {
    views: Vec<Box<dyn View>>,
}

impl ViewStack {
    pub fn new(mut home: Box<dyn View>) -> Self {
        home.on_shown();
        Self { views: vec![home] }
    }

    pub fn push(&mut self, mut view: Box<dyn View>) {
        view.on_shown();
        debug!(view = view.title(), depth = self.views.len() + 1, "view pushed");
        self.views.push(view);
    }

    /// Removes and returns the top view. At depth 1 this is a no-op and
    /// returns `None`.
    pub fn pop(&mut self) -> Option<Box<dyn View>> {
        if self.views.len() <= 1 {
            return None;
        }
        let popped = self.views.pop();
        let depth = self.views.len();
        let top = self.top_mut();
        top.on_shown();
        debug!(view = top.title(), depth, "view popped");
        popped
    }

    pub fn top(&self) -> &dyn View {
        let last = self.views.len() - 1;
        self.views[last].as_ref()
    }

    pub fn top_mut(&mut self) -> &mut dyn View {
        let last = self.views.len() - 1;
        self.views[last].as_mut()
    }

    pub fn depth(&self) -> usize {
        self.views.len()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.views.iter().map(|view| view.title()).collect()
    }
}
