use confluence_crx_core::config::{self, Config};

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert!(cfg.store_path.to_string_lossy().contains("confluence-crx"));
    assert!(cfg.config_path.to_string_lossy().ends_with("config.toml"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_empty_store_path() {
    let cfg = Config {
        store_path: "".into(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn missing_file_yields_defaults_at_that_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.store_path, Config::default().store_path);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        store_path: dir.path().join("kv.sqlite3"),
        log_dir: dir.path().join("logs"),
        tabs_path: Some(dir.path().join("tabs.json5")),
        config_path: dir.path().join("nested").join("config.toml"),
    };
    config::save(&cfg).unwrap();

    let loaded = config::load(Some(&cfg.config_path)).unwrap();
    assert_eq!(loaded, cfg);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "store_path = [").unwrap();

    assert!(matches!(
        config::load(Some(&path)),
        Err(config::ConfigError::Parse { .. })
    ));
}
