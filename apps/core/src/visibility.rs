use serde::{Deserialize, Serialize};

/// How the overlay reacts when it loses focus to another window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivatePolicy {
    /// Select the whole query, then hide; typing after reopening replaces it.
    #[default]
    SelectAll,
    /// Hide and leave the query untouched.
    HideOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    ShowAndFocus,
    Hide,
    SelectAllThenHide,
}

/// Tracks whether the overlay is on screen and decides the window commands
/// for toggles, explicit hides and focus loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityController {
    visible: bool,
    policy: DeactivatePolicy,
}

impl Default for VisibilityController {
    fn default() -> Self {
        Self::new(DeactivatePolicy::default())
    }
}

impl VisibilityController {
    pub fn new(policy: DeactivatePolicy) -> Self {
        Self {
            visible: false,
            policy,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn policy(&self) -> DeactivatePolicy {
        self.policy
    }

    pub fn toggle(&mut self) -> WindowCommand {
        if self.visible {
            self.visible = false;
            WindowCommand::Hide
        } else {
            self.visible = true;
            WindowCommand::ShowAndFocus
        }
    }

    pub fn hide(&mut self) -> Option<WindowCommand> {
        if !self.visible {
            return None;
        }
        self.visible = false;
        Some(WindowCommand::Hide)
    }

    pub fn on_deactivate(&mut self) -> Option<WindowCommand> {
        if !self.visible {
            return None;
        }
        self.visible = false;
        Some(match self.policy {
            DeactivatePolicy::SelectAll => WindowCommand::SelectAllThenHide,
            DeactivatePolicy::HideOnly => WindowCommand::Hide,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DeactivatePolicy, VisibilityController, WindowCommand};

    #[test]
    fn toggle_alternates_show_and_hide() {
        let mut controller = VisibilityController::default();
        assert_eq!(controller.toggle(), WindowCommand::ShowAndFocus);
        assert!(controller.is_visible());
        assert_eq!(controller.toggle(), WindowCommand::Hide);
        assert!(!controller.is_visible());
    }

    #[test]
    fn hide_only_acts_when_visible() {
        let mut controller = VisibilityController::default();
        assert_eq!(controller.hide(), None);
        controller.toggle();
        assert_eq!(controller.hide(), Some(WindowCommand::Hide));
        assert_eq!(controller.hide(), None);
    }

    #[test]
    fn deactivate_follows_policy() {
        let mut select_all = VisibilityController::new(DeactivatePolicy::SelectAll);
        select_all.toggle();
        assert_eq!(
            select_all.on_deactivate(),
            Some(WindowCommand::SelectAllThenHide)
        );

        let mut hide_only = VisibilityController::new(DeactivatePolicy::HideOnly);
        hide_only.toggle();
        assert_eq!(hide_only.on_deactivate(), Some(WindowCommand::Hide));
        assert_eq!(hide_only.on_deactivate(), None);
    }
}
