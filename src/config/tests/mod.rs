//! Unit tests for config module
//!
//! Tests configuration types, defaults, TOML parsing and import merging.

#![allow(clippy::unwrap_used)]

use std::fs;

use tempfile::TempDir;

use crate::{
    BridgeError,
    config::{Config, LogLevel, MprisConfig},
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert!(config.mpris.enabled);
    assert_eq!(config.mpris.name, "Sendspin");
    assert_eq!(config.mpris.desktop_entry, None);
    assert_eq!(config.mpris.shutdown_timeout().as_millis(), 1000);
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = toml::to_string(&original).unwrap();
    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[mpris]"));

    let deserialized: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(original, deserialized);
}

#[test]
fn partial_mpris_section_keeps_defaults() {
    let config = Config::from_toml_str(
        r#"
        [mpris]
        desktop_entry = "sendspin"
        "#,
    )
    .unwrap();

    assert_eq!(config.mpris.desktop_entry.as_deref(), Some("sendspin"));
    assert_eq!(config.mpris, MprisConfig {
        desktop_entry: Some("sendspin".to_string()),
        ..MprisConfig::default()
    });
}

#[test]
fn invalid_log_level_is_rejected() {
    let result = Config::from_toml_str(
        r#"
        [general]
        log_level = "shouting"
        "#,
    );

    assert!(result.is_err());
}

#[test]
fn imports_are_merged_under_main_file() {
    let dir = TempDir::new().unwrap();

    fs::write(
        dir.path().join("shared.toml"),
        r#"
[general]
log_level = "debug"

[mpris]
name = "Imported"
shutdown_timeout_ms = 250
"#,
    )
    .unwrap();

    let main = dir.path().join("config.toml");
    fs::write(
        &main,
        r#"
"@shared" = true

[mpris]
name = "Living Room"
"#,
    )
    .unwrap();

    let config = Config::load_with_imports(&main).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.mpris.name, "Living Room");
    assert_eq!(config.mpris.shutdown_timeout_ms, 250);
}

#[test]
fn missing_main_file_reports_io_error() {
    let dir = TempDir::new().unwrap();

    let err = Config::load_with_imports(&dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, BridgeError::IoError { .. }));
}

#[test]
fn missing_import_reports_import_error() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("config.toml");
    fs::write(&main, "\"@missing\" = true\n").unwrap();

    let err = Config::load_with_imports(&main).unwrap_err();

    assert!(err.to_string().contains("failed to import"));
}
