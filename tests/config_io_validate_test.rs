use hestia::config::Config;
use std::fs;

fn populated() -> Config {
    let mut cfg = Config::default();
    cfg.panel.url = "https://panel.example.com".to_string();
    cfg.panel.username = "user".to_string();
    cfg.panel.password = "secret".to_string();
    cfg
}

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = populated();
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.panel.url, "https://panel.example.com");
    assert_eq!(loaded.logging.file, cfg.logging.file);
    assert_eq!(loaded.schedule.offset_second, 31);
}

#[test]
fn config_validation_errors() {
    let mut cfg = populated();
    assert!(cfg.validate().is_ok());

    // Missing URL
    cfg.panel.url.clear();
    assert!(cfg.validate().is_err());

    // Missing password
    cfg = populated();
    cfg.panel.password.clear();
    assert!(cfg.validate().is_err());

    // Missing browser executable path
    cfg = populated();
    cfg.panel.exec_path.clear();
    assert!(cfg.validate().is_err());

    // Offset second out of range
    cfg = populated();
    cfg.schedule.offset_second = 61;
    assert!(cfg.validate().is_err());

    // Zero timeout
    cfg = populated();
    cfg.timeouts.params_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}
