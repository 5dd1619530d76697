use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::hotkey::{parse_chord, Chord, HotkeyAction, HotkeyError};
use crate::visibility::DeactivatePolicy;

const CONFIG_FILE_NAME: &str = "config.json5";
const DEFAULT_HOTKEY: &str = "Meta+Alt+Space";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Hotkey(#[from] HotkeyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    pub chord: String,
    pub action: HotkeyAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub application_roots: Vec<PathBuf>,
    pub application_extensions: Vec<String>,
    pub application_scan_depth: usize,
    pub clipboard_enabled: bool,
    pub clipboard_poll_interval_ms: u64,
    pub clipboard_max_entries: usize,
    pub clipboard_sensitive_patterns: Vec<String>,
    pub deactivate_policy: DeactivatePolicy,
    pub log_level: String,
    pub hotkeys: Vec<HotkeyBinding>,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application_roots: default_application_roots(),
            application_extensions: default_application_extensions(),
            application_scan_depth: 3,
            clipboard_enabled: true,
            clipboard_poll_interval_ms: 100,
            clipboard_max_entries: 200,
            clipboard_sensitive_patterns: vec![
                "password".to_string(),
                "secret".to_string(),
                "token".to_string(),
            ],
            deactivate_policy: DeactivatePolicy::default(),
            log_level: "info".to_string(),
            hotkeys: vec![HotkeyBinding {
                chord: DEFAULT_HOTKEY.to_string(),
                action: HotkeyAction::ToggleWindow,
            }],
            config_path: default_config_path(),
        }
    }
}

impl Config {
    /// Parses every configured binding.
    pub fn chords(&self) -> Result<Vec<(Chord, HotkeyAction)>, ConfigError> {
        self.hotkeys
            .iter()
            .map(|binding| Ok((parse_chord(&binding.chord)?, binding.action)))
            .collect()
    }

    pub fn clipboard_poll_interval(&self) -> Duration {
        Duration::from_millis(self.clipboard_poll_interval_ms)
    }
}

/// Per-user data directory; logs and the default config live under it.
pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("quicklaunch")
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

/// Loads the config at `path` (or the default location). A missing file is
/// created with defaults. `.toml` files are read as TOML, everything else as
/// JSON5.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if !path.exists() {
        let config = Config {
            config_path: path,
            ..Config::default()
        };
        save(&config)?;
        info!(path = %config.config_path.display(), "wrote default config");
        return Ok(config);
    }

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let mut config = parse(&path, &raw)?;
    config.config_path = path;
    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = &config.config_path;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let serialized = if is_toml(path) {
        toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?
    } else {
        serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?
    };
    fs::write(path, serialized).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.hotkeys.is_empty() {
        return Err(ConfigError::Invalid("at least one hotkey is required".into()));
    }
    cfg.chords()?;

    if cfg.application_extensions.iter().all(|ext| ext.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "application_extensions must name at least one extension".into(),
        ));
    }

    if !(1..=16).contains(&cfg.application_scan_depth) {
        return Err(ConfigError::Invalid(
            "application_scan_depth must be between 1 and 16".into(),
        ));
    }

    if !(10..=5_000).contains(&cfg.clipboard_poll_interval_ms) {
        return Err(ConfigError::Invalid(
            "clipboard_poll_interval_ms must be between 10 and 5000".into(),
        ));
    }

    if !(1..=10_000).contains(&cfg.clipboard_max_entries) {
        return Err(ConfigError::Invalid(
            "clipboard_max_entries must be between 1 and 10000".into(),
        ));
    }

    if cfg.log_level.parse::<tracing::Level>().is_err() {
        return Err(ConfigError::Invalid(format!(
            "unknown log_level '{}'",
            cfg.log_level
        )));
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("config_path is required".into()));
    }

    Ok(())
}

fn parse(path: &Path, raw: &str) -> Result<Config, ConfigError> {
    let parsed = if is_toml(path) {
        toml::from_str(raw).map_err(|e| e.to_string())
    } else {
        json5::from_str(raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

fn default_application_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let mut roots = vec![
            PathBuf::from("/Applications"),
            PathBuf::from("/System/Applications"),
        ];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Applications"));
        }
        roots
    }

    #[cfg(target_os = "windows")]
    {
        let mut roots = Vec::new();
        if let Some(program_data) = std::env::var_os("ProgramData") {
            roots.push(
                PathBuf::from(program_data)
                    .join("Microsoft")
                    .join("Windows")
                    .join("Start Menu")
                    .join("Programs"),
            );
        }
        if let Some(roaming) = dirs::data_dir() {
            roots.push(
                roaming
                    .join("Microsoft")
                    .join("Windows")
                    .join("Start Menu")
                    .join("Programs"),
            );
        }
        roots
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut roots = vec![PathBuf::from("/usr/share/applications")];
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("applications"));
        }
        roots
    }
}

fn default_application_extensions() -> Vec<String> {
    let extensions: &[&str] = if cfg!(target_os = "macos") {
        &["app"]
    } else if cfg!(target_os = "windows") {
        &["lnk", "url"]
    } else {
        &["desktop"]
    };
    extensions.iter().map(|ext| ext.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::{validate, Config, ConfigError};

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.config_path.to_string_lossy().contains("quicklaunch"));
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.chords().unwrap().len(), 1);
    }

    #[test]
    fn rejects_poll_interval_out_of_range() {
        let cfg = Config {
            clipboard_poll_interval_ms: 1,
            ..Config::default()
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unparseable_hotkey() {
        let mut cfg = Config::default();
        cfg.hotkeys[0].chord = "Space".to_string();
        assert!(matches!(validate(&cfg), Err(ConfigError::Hotkey(_))));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let cfg = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert!(validate(&cfg).is_err());
    }
}
