use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub path: PathBuf,
}

impl Application {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    ClipboardHistory,
    About,
    OpenLogs,
    OpenConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub id: CommandId,
}

pub fn built_in_commands() -> Vec<Command> {
    vec![
        Command {
            name: "Clipboard History",
            id: CommandId::ClipboardHistory,
        },
        Command {
            name: "About Quicklaunch",
            id: CommandId::About,
        },
        Command {
            name: "Open Logs Folder",
            id: CommandId::OpenLogs,
        },
        Command {
            name: "Open Config File",
            id: CommandId::OpenConfig,
        },
    ]
}

/// Supplies the home view's applications and commands. Called each time the
/// home view is built.
pub trait CatalogueSource {
    fn list_applications(&self) -> Result<Vec<Application>, SourceError>;

    fn list_commands(&self) -> Vec<Command> {
        built_in_commands()
    }
}

/// Fixed application list; useful for tests and for hosts that scan
/// applications themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogueSource {
    apps: Vec<Application>,
}

impl StaticCatalogueSource {
    pub fn new(apps: Vec<Application>) -> Self {
        Self { apps }
    }
}

impl CatalogueSource for StaticCatalogueSource {
    fn list_applications(&self) -> Result<Vec<Application>, SourceError> {
        Ok(self.apps.clone())
    }
}

/// Finds applications by walking directories for entries with one of the
/// configured extensions (`.app` bundles, `.desktop` files, shortcuts).
/// Matching directories are reported but never descended into.
#[derive(Debug, Clone)]
pub struct ApplicationDirectorySource {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    max_depth: usize,
}

impl ApplicationDirectorySource {
    pub fn new(roots: Vec<PathBuf>, extensions: Vec<String>, max_depth: usize) -> Self {
        Self {
            roots,
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            max_depth: max_depth.max(1),
        }
    }

    fn wanted(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|wanted| *wanted == ext)
            })
            .unwrap_or(false)
    }

    fn scan_root(&self, root: &Path, seen: &mut HashSet<PathBuf>, out: &mut Vec<Application>) {
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(true)
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    debug!(root = %root.display(), %error, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if !self.wanted(path) {
                continue;
            }
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if name.trim().is_empty() || !seen.insert(path.to_path_buf()) {
                continue;
            }
            out.push(Application::new(name, path));
        }
    }
}

impl CatalogueSource for ApplicationDirectorySource {
    fn list_applications(&self) -> Result<Vec<Application>, SourceError> {
        let mut seen = HashSet::new();
        let mut apps = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                warn!(root = %root.display(), "application root is not a directory");
                continue;
            }
            self.scan_root(root, &mut seen, &mut apps);
        }
        apps.sort_by_cached_key(|app| app.name.to_lowercase());
        debug!(count = apps.len(), "applications discovered");
        Ok(apps)
    }
}
