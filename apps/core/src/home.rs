use std::path::PathBuf;
use std::rc::Rc;

use tracing::{info, warn};

use crate::action_executor::ActionRunner;
use crate::catalogue::{CatalogueSource, Command, CommandId};
use crate::clipboard_history::{ClipboardAccess, ClipboardView, SharedClipboardHistory};
use crate::model::{ActionError, Item, ItemKind};
use crate::selectable_list::SelectableList;
use crate::view::{Followup, PanelView};

pub const HOME_TITLE: &str = "Quicklaunch";

/// Collaborators the home view's item actions close over.
#[derive(Clone)]
pub struct HomeContext {
    pub runner: Rc<dyn ActionRunner>,
    pub clipboard_history: SharedClipboardHistory,
    pub clipboard: Rc<dyn ClipboardAccess>,
    pub clipboard_enabled: bool,
    pub hotkeys: Vec<String>,
    pub config_path: PathBuf,
    pub logs_dir: PathBuf,
}

/// Builds the root list: every application from `source` plus the built-in
/// commands, ordered by label ignoring case. A failing source leaves only
/// the commands.
pub fn build_home_view(source: &dyn CatalogueSource, context: &HomeContext) -> SelectableList {
    let mut items = match source.list_applications() {
        Ok(apps) => apps
            .into_iter()
            .map(|app| {
                let runner = Rc::clone(&context.runner);
                let path = app.path;
                Item::new(app.name, ItemKind::Application).with_action(move || {
                    runner.open(&path)?;
                    Ok(Followup::Dismiss)
                })
            })
            .collect(),
        Err(error) => {
            warn!(%error, "application source failed; home view lists commands only");
            Vec::new()
        }
    };

    items.extend(
        source
            .list_commands()
            .into_iter()
            .filter(|command| {
                context.clipboard_enabled || command.id != CommandId::ClipboardHistory
            })
            .map(|command| command_item(command, context)),
    );
    items.sort_by_cached_key(|item| item.label().to_lowercase());

    info!(items = items.len(), "home view built");
    SelectableList::new(HOME_TITLE, items)
}

fn command_item(command: Command, context: &HomeContext) -> Item {
    let item = Item::new(command.name, ItemKind::Command);
    match command.id {
        CommandId::ClipboardHistory => {
            let history = Rc::clone(&context.clipboard_history);
            let clipboard = Rc::clone(&context.clipboard);
            item.with_action(move || {
                Ok(Followup::Push(Box::new(ClipboardView::new(
                    Rc::clone(&history),
                    Rc::clone(&clipboard),
                ))))
            })
        }
        CommandId::About => {
            let lines = about_lines(context);
            item.with_action(move || {
                Ok(Followup::Push(Box::new(PanelView::new(
                    "About Quicklaunch",
                    lines.clone(),
                ))))
            })
        }
        CommandId::OpenLogs => {
            let runner = Rc::clone(&context.runner);
            let dir = context.logs_dir.clone();
            item.with_action(move || {
                std::fs::create_dir_all(&dir).map_err(|error| {
                    ActionError::Failed(format!("failed to create logs dir: {error}"))
                })?;
                runner.open(&dir)?;
                Ok(Followup::Dismiss)
            })
        }
        CommandId::OpenConfig => {
            let runner = Rc::clone(&context.runner);
            let path = context.config_path.clone();
            item.with_action(move || {
                runner.open(&path)?;
                Ok(Followup::Dismiss)
            })
        }
    }
}

fn about_lines(context: &HomeContext) -> Vec<String> {
    let mut lines = vec![format!("Quicklaunch {}", env!("CARGO_PKG_VERSION"))];
    lines.extend(context.hotkeys.iter().map(|chord| format!("Hotkey: {chord}")));
    lines.push(format!("Config: {}", context.config_path.display()));
    lines.push(format!("Logs: {}", context.logs_dir.display()));
    lines
}
