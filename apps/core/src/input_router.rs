use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use crate::hotkey::HotkeyAction;
use crate::keys::{Key, KeyEvent};
use crate::model::ActionError;
use crate::surface::RenderSurface;
use crate::view::{Followup, View};
use crate::view_stack::ViewStack;
use crate::visibility::{VisibilityController, WindowCommand};

/// Outcome of routing one key event from the search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    ClearedQuery,
    PoppedView,
    Hid,
    Forwarded,
    Activated,
    /// Left for the text field's own editing.
    TextInput,
    /// Nothing wanted the key.
    Ignored,
}

impl KeyDisposition {
    /// Whether the toolkit should stop processing the event.
    pub fn is_consumed(self) -> bool {
        !matches!(self, Self::TextInput | Self::Ignored)
    }
}

/// Model of the search field contents. Editing is append-only; the real
/// toolkit field owns caret movement.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryField {
    text: String,
    selected_all: bool,
}

impl QueryField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_selected_all(&self) -> bool {
        self.selected_all
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.selected_all = false;
    }

    pub fn select_all(&mut self) {
        self.selected_all = !self.text.is_empty();
    }

    /// Applies a printable key or Backspace. A selected query is replaced
    /// (or erased) as a whole. Returns true when the text changed.
    pub fn apply_edit(&mut self, event: &KeyEvent) -> bool {
        let before_len = self.text.len();
        let was_selected = self.selected_all;
        if event.is_printable() {
            if was_selected {
                self.text.clear();
            }
            self.text.push_str(event.text.as_deref().unwrap_or_default());
            self.selected_all = false;
            return true;
        }
        if event.key == Key::Backspace {
            if was_selected {
                self.text.clear();
            } else {
                self.text.pop();
            }
            self.selected_all = false;
            return self.text.len() != before_len;
        }
        false
    }
}

#[derive(Debug)]
pub enum EngineFailure {
    ItemAction { view: String, error: ActionError },
    HotkeyUnavailable { reason: String },
}

impl std::fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemAction { view, error } => write!(f, "action in '{view}' failed: {error}"),
            Self::HotkeyUnavailable { reason } => {
                write!(f, "global hotkey toggle unavailable: {reason}")
            }
        }
    }
}

/// Receives failures the engine recovered from.
pub trait FailureSink {
    fn report(&mut self, failure: EngineFailure);
}

impl FailureSink for Vec<EngineFailure> {
    fn report(&mut self, failure: EngineFailure) {
        self.push(failure);
    }
}

/// Sink that only writes failures to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

impl FailureSink for LogFailureSink {
    fn report(&mut self, failure: EngineFailure) {
        match &failure {
            EngineFailure::ItemAction { .. } => warn!(%failure, "item action failed"),
            EngineFailure::HotkeyUnavailable { .. } => error!(%failure, "hotkey capture lost"),
        }
    }
}

/// Routes search-field key events to the top view or to the structural
/// actions (clear, pop, hide). Owns all state the UI thread mutates.
pub struct InputRouter<S, F> {
    stack: ViewStack,
    query: QueryField,
    visibility: VisibilityController,
    surface: S,
    failures: F,
    capture_lost: bool,
}

impl<S: RenderSurface, F: FailureSink> InputRouter<S, F> {
    pub fn new(
        home: Box<dyn View>,
        visibility: VisibilityController,
        surface: S,
        failures: F,
    ) -> Self {
        let mut router = Self {
            stack: ViewStack::new(home),
            query: QueryField::default(),
            visibility,
            surface,
            failures,
            capture_lost: false,
        };
        router.redraw();
        router
    }

    /// Classifies one key event, strictly in this order: Escape, Up/Down,
    /// Enter, text editing, everything else.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyDisposition {
        match event.key {
            Key::Escape => return self.escape(),
            Key::Up | Key::Down => {
                if self.stack.top().supports_key_event() {
                    self.stack.top_mut().handle_key(event);
                    self.redraw();
                    return KeyDisposition::Forwarded;
                }
                return KeyDisposition::TextInput;
            }
            Key::Enter if self.stack.top().supports_activation() => {
                self.activate_top();
                return KeyDisposition::Activated;
            }
            _ => {}
        }

        if event.is_printable() || event.key == Key::Backspace {
            return KeyDisposition::TextInput;
        }

        if self.stack.top().supports_key_event() && self.stack.top_mut().handle_key(event) {
            self.redraw();
            return KeyDisposition::Forwarded;
        }
        debug!(key = %event.key, "key ignored");
        KeyDisposition::Ignored
    }

    /// Text-field change notification from the toolkit.
    pub fn on_query_changed(&mut self, text: &str) {
        self.query.set_text(text);
        self.forward_query();
        self.redraw();
    }

    /// Routes a key and, when it is left for the text field, performs the
    /// edit on the query model as a toolkit field would.
    pub fn press(&mut self, event: &KeyEvent) -> KeyDisposition {
        let disposition = self.handle_key(event);
        if disposition == KeyDisposition::TextInput && self.query.apply_edit(event) {
            let text = self.query.text().to_string();
            self.surface.set_query_text(&text, false);
            self.on_query_changed(&text);
        }
        disposition
    }

    pub fn on_hotkey(&mut self, action: HotkeyAction) {
        match action {
            HotkeyAction::ToggleWindow => self.toggle(),
        }
    }

    pub fn toggle(&mut self) {
        let command = self.visibility.toggle();
        self.apply_window_command(command);
    }

    pub fn hide(&mut self) {
        if let Some(command) = self.visibility.hide() {
            self.apply_window_command(command);
        }
    }

    /// The window lost focus to another application.
    pub fn on_deactivate(&mut self) {
        if let Some(command) = self.visibility.on_deactivate() {
            self.apply_window_command(command);
        }
    }

    /// Reports a dead capture thread once; later reports are dropped.
    pub fn on_capture_lost(&mut self, reason: &str) {
        if self.capture_lost {
            return;
        }
        self.capture_lost = true;
        self.failures.report(EngineFailure::HotkeyUnavailable {
            reason: reason.to_string(),
        });
    }

    pub fn push_view(&mut self, view: Box<dyn View>) {
        self.stack.push(view);
        self.replace_query("");
        self.redraw();
    }

    pub fn stack(&self) -> &ViewStack {
        &self.stack
    }

    pub fn query(&self) -> &QueryField {
        &self.query
    }

    pub fn visibility(&self) -> &VisibilityController {
        &self.visibility
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn failures(&self) -> &F {
        &self.failures
    }

    /// Lets the top view reload its data, then re-applies the query to it.
    pub fn refresh_top(&mut self) {
        self.stack.top_mut().on_shown();
        self.forward_query();
        self.redraw();
    }

    pub fn redraw(&mut self) {
        self.stack.top().render(&mut self.surface);
    }

    fn escape(&mut self) -> KeyDisposition {
        if !self.query.is_empty() {
            self.replace_query("");
            self.redraw();
            return KeyDisposition::ClearedQuery;
        }
        if self.stack.pop().is_some() {
            self.forward_query();
            self.redraw();
            return KeyDisposition::PoppedView;
        }
        self.hide();
        KeyDisposition::Hid
    }

    fn activate_top(&mut self) {
        let top = self.stack.top_mut();
        let view = top.title().to_string();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| top.activate()))
            .unwrap_or_else(|payload| Err(ActionError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(Followup::Stay) => self.redraw(),
            Ok(Followup::Dismiss) => {
                info!(view = %view, "item activated; dismissing");
                self.hide();
            }
            Ok(Followup::Push(next)) => {
                info!(view = %view, next = next.title(), "item activated; pushing view");
                self.push_view(next);
            }
            Err(error) => {
                self.failures.report(EngineFailure::ItemAction { view, error });
                self.redraw();
            }
        }
    }

    fn apply_window_command(&mut self, command: WindowCommand) {
        match command {
            WindowCommand::ShowAndFocus => {
                self.surface.show_window();
                self.surface.raise_window();
                self.surface.focus_input();
                self.surface
                    .set_query_text(self.query.text(), self.query.is_selected_all());
                self.refresh_top();
            }
            WindowCommand::Hide => self.surface.hide_window(),
            WindowCommand::SelectAllThenHide => {
                self.query.select_all();
                self.surface
                    .set_query_text(self.query.text(), self.query.is_selected_all());
                self.surface.hide_window();
            }
        }
        debug!(?command, visible = self.visibility.is_visible(), "window command applied");
    }

    fn replace_query(&mut self, text: &str) {
        self.query.set_text(text);
        self.surface.set_query_text(text, false);
        self.forward_query();
    }

    fn forward_query(&mut self) {
        let top = self.stack.top_mut();
        if top.supports_filter_text() {
            top.set_filter_text(self.query.text());
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload unavailable".to_string())
}
