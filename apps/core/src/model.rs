use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::view::Followup;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("launch error: {0}")]
    Launch(#[from] crate::action_executor::LaunchError),
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("action panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Failed(String),
}

/// Zero-argument action bound to an item. Clones share the same closure.
pub type ItemAction = Rc<dyn Fn() -> Result<Followup, ActionError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Application,
    Command,
    Clipboard,
}

/// Opaque icon handle; only the render surface interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon(PathBuf);

impl Icon {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &Path {
        &self.0
    }
}

#[derive(Clone)]
pub struct Item {
    label: String,
    kind: ItemKind,
    action: Option<ItemAction>,
    icon: Option<Icon>,
    normalized_label: String,
}

impl Item {
    pub fn new(label: impl Into<String>, kind: ItemKind) -> Self {
        let label = label.into();
        let normalized_label = normalize_for_search(&label);
        Self {
            label,
            kind,
            action: None,
            icon: None,
            normalized_label,
        }
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> Result<Followup, ActionError> + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn action(&self) -> Option<&ItemAction> {
        self.action.as_ref()
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    /// Icons may be resolved after the catalogue is built; nothing else on an
    /// item changes after construction.
    pub fn set_icon(&mut self, icon: Option<Icon>) {
        self.icon = icon;
    }

    pub fn matches(&self, normalized_query: &str) -> bool {
        self.normalized_label.contains(normalized_query)
    }
}

impl Debug for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("has_action", &self.action.is_some())
            .field("icon", &self.icon)
            .finish()
    }
}

pub fn normalize_for_search(input: &str) -> String {
    input.to_lowercase()
}
