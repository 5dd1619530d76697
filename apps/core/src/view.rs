use std::fmt::{Debug, Formatter};

use crate::keys::KeyEvent;
use crate::model::ActionError;
use crate::surface::RenderSurface;

/// What the engine should do after an item action ran successfully.
pub enum Followup {
    /// Leave the window and the stack as they are.
    Stay,
    /// Hide the window.
    Dismiss,
    /// Push a new view on top and clear the query so it starts unfiltered.
    Push(Box<dyn View>),
}

impl Debug for Followup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stay => write!(f, "Stay"),
            Self::Dismiss => write!(f, "Dismiss"),
            Self::Push(view) => write!(f, "Push({})", view.title()),
        }
    }
}

/// A screen that can sit on the view stack.
///
/// Optional behaviour is declared through the `supports_*` methods; the
/// router only calls the matching operation when the capability is
/// advertised. The defaults describe a passive view that ignores input.
pub trait View {
    fn title(&self) -> &str;

    fn supports_filter_text(&self) -> bool {
        false
    }

    fn set_filter_text(&mut self, _query: &str) {}

    fn supports_key_event(&self) -> bool {
        false
    }

    /// Returns true when the view used the key.
    fn handle_key(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn supports_activation(&self) -> bool {
        false
    }

    fn activate(&mut self) -> Result<Followup, ActionError> {
        Ok(Followup::Stay)
    }

    /// Called every time the view becomes the top of the stack.
    fn on_shown(&mut self) {}

    fn render(&self, surface: &mut dyn RenderSurface);
}

/// Static text view with no input capabilities.
pub struct PanelView {
    title: String,
    lines: Vec<String>,
}

impl PanelView {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl View for PanelView {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_panel(&self.title, &self.lines);
    }
}
