use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("empty path")]
    EmptyPath,
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),
    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },
}

/// Starts applications and opens files on behalf of item actions. Callers
/// only learn whether the launch was handed off, never its result.
pub trait ActionRunner {
    fn open(&self, target: &Path) -> Result<(), LaunchError>;
}

pub fn validate_target(target: &Path) -> Result<(), LaunchError> {
    if target.as_os_str().is_empty() || target.to_string_lossy().trim().is_empty() {
        return Err(LaunchError::EmptyPath);
    }
    if !target.exists() {
        return Err(LaunchError::MissingPath(target.to_path_buf()));
    }
    Ok(())
}

/// Opens targets with the platform opener (`open`, `xdg-open`, `cmd /C start`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemActionRunner;

impl ActionRunner for SystemActionRunner {
    fn open(&self, target: &Path) -> Result<(), LaunchError> {
        validate_target(target)?;

        let mut command = opener_command(target);
        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command.spawn().map_err(|error| LaunchError::Spawn {
            program: program.clone(),
            message: error.to_string(),
        })?;
        info!(path = %target.display(), program = %program, "launch requested");

        // Reaped off-thread; the UI thread never waits on the opener.
        std::thread::spawn(move || match child.wait() {
            Ok(status) => debug!(%status, "opener exited"),
            Err(error) => debug!(%error, "failed to wait for opener"),
        });
        Ok(())
    }
}

fn opener_command(target: &Path) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(target);
        command
    }

    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.arg("/C").arg("start").arg("").arg(target);
        command
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(target);
        command
    }
}

/// Runner that validates and records targets instead of launching them.
#[derive(Debug, Default)]
pub struct RecordingActionRunner {
    opened: RefCell<Vec<PathBuf>>,
}

impl RecordingActionRunner {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }
}

impl ActionRunner for RecordingActionRunner {
    fn open(&self, target: &Path) -> Result<(), LaunchError> {
        validate_target(target)?;
        self.opened.borrow_mut().push(target.to_path_buf());
        Ok(())
    }
}
