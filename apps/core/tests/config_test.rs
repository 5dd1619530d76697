use quicklaunch_core::config::{self, Config, ConfigError};
use quicklaunch_core::hotkey::HotkeyAction;
use quicklaunch_core::visibility::DeactivatePolicy;

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json5");

    let cfg = config::load(Some(&path)).unwrap();

    assert!(path.exists());
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.hotkeys.len(), 1);
    assert_eq!(cfg.hotkeys[0].action, HotkeyAction::ToggleWindow);

    let reloaded = config::load(Some(&path)).unwrap();
    assert_eq!(reloaded, cfg);
}

#[test]
fn json5_config_with_comments_and_partial_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(
        &path,
        r#"{
            // only what differs from the defaults
            deactivate_policy: "hide_only",
            clipboard_max_entries: 5,
            hotkeys: [{ chord: "ctrl+shift+space", action: "toggle_window" }],
        }"#,
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.deactivate_policy, DeactivatePolicy::HideOnly);
    assert_eq!(cfg.clipboard_max_entries, 5);
    assert_eq!(cfg.clipboard_poll_interval_ms, 100);
    let chords = cfg.chords().unwrap();
    assert_eq!(chords.len(), 1);
    assert_eq!(chords[0].0.to_string(), "Ctrl+Shift+Space");
}

#[test]
fn toml_config_round_trips_through_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let cfg = Config {
        clipboard_enabled: false,
        log_level: "debug".to_string(),
        config_path: path.clone(),
        ..Config::default()
    };

    config::save(&cfg).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("clipboard_enabled = false"));

    let loaded = config::load(Some(&path)).unwrap();
    assert_eq!(loaded, cfg);
}

#[test]
fn invalid_hotkey_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(
        &path,
        r#"{ hotkeys: [{ chord: "alt+tab", action: "toggle_window" }] }"#,
    )
    .unwrap();

    let error = config::load(Some(&path)).unwrap_err();
    assert!(matches!(error, ConfigError::Hotkey(_)));
}

#[test]
fn malformed_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(&path, "{ hotkeys: [").unwrap();

    let error = config::load(Some(&path)).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
    assert!(error.to_string().contains("config.json5"));
}

#[test]
fn empty_hotkey_list_is_invalid() {
    let cfg = Config {
        hotkeys: Vec::new(),
        ..Config::default()
    };
    assert!(matches!(
        config::validate(&cfg),
        Err(ConfigError::Invalid(_))
    ));
}
