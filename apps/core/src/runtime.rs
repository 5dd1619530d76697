use std::io::{self, BufRead};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::action_executor::SystemActionRunner;
use crate::capture::{default_key_source, spawn_capture, CaptureSignal};
use crate::catalogue::ApplicationDirectorySource;
use crate::chord::ChordMatcher;
use crate::clipboard_history::{
    spawn_clipboard_poller, ClipboardChange, ClipboardHistory, SharedClipboardHistory,
    SystemClipboard, CLIPBOARD_TITLE,
};
use crate::config::{self, ConfigError};
use crate::home::{build_home_view, HomeContext};
use crate::input_router::{FailureSink, InputRouter, LogFailureSink};
use crate::keys::{Key, KeyEvent};
use crate::logging;
use crate::surface::{RenderSurface, TerminalSurface};
use crate::visibility::VisibilityController;

const TERMINAL_ROWS: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to start {thread} thread: {source}")]
    Thread {
        thread: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to print config: {0}")]
    PrintConfig(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "quicklaunch", version, about = "Keyboard-driven launcher")]
pub struct CliOptions {
    /// Config file (`.json5` or `.toml`); created with defaults if missing.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Log level or filter directive; overrides the config file.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, clap::Error> {
    CliOptions::try_parse_from(std::iter::once("quicklaunch").chain(args.iter().map(String::as_str)))
}

/// Headless shell input, one per stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Key(Key),
    Type(String),
    Toggle,
    Hide,
    Deactivate,
    Quit,
    Unknown(String),
}

pub fn parse_shell_command(line: &str) -> Option<ShellCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match word.to_ascii_lowercase().as_str() {
        "esc" | "escape" => ShellCommand::Key(Key::Escape),
        "up" => ShellCommand::Key(Key::Up),
        "down" => ShellCommand::Key(Key::Down),
        "enter" | "return" => ShellCommand::Key(Key::Enter),
        "backspace" | "bs" => ShellCommand::Key(Key::Backspace),
        "key" if !rest.trim().is_empty() => ShellCommand::Key(Key::from_name(rest)),
        "type" if !rest.is_empty() => ShellCommand::Type(rest.to_string()),
        "toggle" => ShellCommand::Toggle,
        "hide" => ShellCommand::Hide,
        "blur" => ShellCommand::Deactivate,
        "quit" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.to_string()),
    };
    Some(command)
}

/// Everything the UI thread reacts to, merged into one channel.
#[derive(Debug)]
pub enum UiEvent {
    Capture(CaptureSignal),
    Clipboard(ClipboardChange),
    Shell(ShellCommand),
    InputClosed,
}

impl From<CaptureSignal> for UiEvent {
    fn from(value: CaptureSignal) -> Self {
        Self::Capture(value)
    }
}

impl From<ClipboardChange> for UiEvent {
    fn from(value: ClipboardChange) -> Self {
        Self::Clipboard(value)
    }
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    if options.print_config {
        let rendered = serde_json::to_string_pretty(&config)
            .map_err(|error| RuntimeError::PrintConfig(error.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let level = options.log_level.unwrap_or_else(|| config.log_level.clone());
    let _logging = logging::init(&level);
    info!(
        mode = runtime_mode(),
        config_path = %config.config_path.display(),
        hotkeys = config.hotkeys.len(),
        "startup"
    );

    let (events, inbox) = mpsc::channel::<UiEvent>();
    let matcher = ChordMatcher::new(config.chords()?);
    spawn_capture(default_key_source(), matcher, events.clone())
        .map_err(thread_error("hotkey-capture"))?;

    let history = ClipboardHistory::new(
        config.clipboard_max_entries,
        config.clipboard_sensitive_patterns.clone(),
    )
    .shared();
    if config.clipboard_enabled {
        spawn_clipboard_poller(
            SystemClipboard,
            config.clipboard_poll_interval(),
            events.clone(),
        )
        .map_err(thread_error("clipboard-poller"))?;
    }
    spawn_stdin_reader(events).map_err(thread_error("stdin-shell"))?;

    let context = HomeContext {
        runner: Rc::new(SystemActionRunner),
        clipboard_history: Rc::clone(&history),
        clipboard: Rc::new(SystemClipboard),
        clipboard_enabled: config.clipboard_enabled,
        hotkeys: config.hotkeys.iter().map(|b| b.chord.clone()).collect(),
        config_path: config.config_path.clone(),
        logs_dir: logging::logs_dir(),
    };
    let source = ApplicationDirectorySource::new(
        config.application_roots.clone(),
        config.application_extensions.clone(),
        config.application_scan_depth,
    );
    let home = build_home_view(&source, &context);

    let mut router = InputRouter::new(
        Box::new(home),
        VisibilityController::new(config.deactivate_policy),
        TerminalSurface::new(io::stdout(), TERMINAL_ROWS),
        LogFailureSink,
    );
    info!("event loop running; type 'toggle' to show the window, 'quit' to exit");

    for event in inbox {
        if !handle_event(&mut router, &history, event) {
            break;
        }
    }
    info!("shutdown");
    Ok(())
}

/// Applies one event on the UI thread. Returns false when the loop should
/// stop.
pub fn handle_event<S, F>(
    router: &mut InputRouter<S, F>,
    history: &SharedClipboardHistory,
    event: UiEvent,
) -> bool
where
    S: RenderSurface,
    F: FailureSink,
{
    match event {
        UiEvent::Capture(CaptureSignal::Chord(action)) => router.on_hotkey(action),
        UiEvent::Capture(CaptureSignal::Unavailable(reason)) => router.on_capture_lost(&reason),
        UiEvent::Clipboard(ClipboardChange(text)) => {
            let added = history.borrow_mut().record(&text);
            if added
                && router.visibility().is_visible()
                && router.stack().top().title() == CLIPBOARD_TITLE
            {
                router.refresh_top();
            }
        }
        UiEvent::Shell(command) => return apply_shell_command(router, command),
        UiEvent::InputClosed => return false,
    }
    true
}

fn apply_shell_command<S, F>(router: &mut InputRouter<S, F>, command: ShellCommand) -> bool
where
    S: RenderSurface,
    F: FailureSink,
{
    match command {
        ShellCommand::Key(key) => {
            let disposition = router.press(&KeyEvent::new(key));
            debug!(?disposition, "key routed");
        }
        ShellCommand::Type(text) => {
            for c in text.chars() {
                router.press(&KeyEvent::typed(c));
            }
        }
        ShellCommand::Toggle => router.toggle(),
        ShellCommand::Hide => router.hide(),
        ShellCommand::Deactivate => router.on_deactivate(),
        ShellCommand::Quit => return false,
        ShellCommand::Unknown(line) => warn!(%line, "unknown shell command"),
    }
    true
}

fn spawn_stdin_reader(events: Sender<UiEvent>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-shell".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if let Some(command) = parse_shell_command(&line) {
                    if events.send(UiEvent::Shell(command)).is_err() {
                        return;
                    }
                }
            }
            let _ = events.send(UiEvent::InputClosed);
        })
}

fn thread_error(thread: &'static str) -> impl FnOnce(io::Error) -> RuntimeError {
    move |source| RuntimeError::Thread { thread, source }
}

fn runtime_mode() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "windows-keyboard-hook"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "headless-no-global-capture"
    }
}
