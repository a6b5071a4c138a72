//! Integration tests for Settings loading with an explicit config file.
//!
//! Layers: defaults → global → explicit file → FILTERTREE_* env.
//! These tests only write temp files; every asserted field is set by the
//! explicit file so a global config on the machine cannot change the outcome.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use filtertree::application::ApplicationError;
use filtertree::config::Settings;

#[test]
fn given_explicit_config_when_load_then_its_values_win() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("filtertree.toml");
    let snapshot = dir.path().join("snap.json");
    let definition = dir.path().join("filters.toml");
    fs::write(
        &config_path,
        format!(
            r#"
snapshot_path = "{}"
definition = "{}"
persist = false

[hooks]
threshold_control = "min-score"
"#,
            snapshot.display(),
            definition.display()
        ),
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(config_path.as_path())).expect("load settings");

    // Assert
    assert_eq!(settings.snapshot_path, snapshot);
    assert_eq!(settings.definition, Some(definition));
    assert!(!settings.persist);
    assert_eq!(settings.hooks.threshold_control, "min-score");
}

#[test]
fn given_tilde_paths_in_config_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("filtertree.toml");
    fs::write(
        &config_path,
        r#"
snapshot_path = "~/filtertree-test/snap.json"
definition = "~/filtertree-test/filters.json"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(config_path.as_path())).expect("load settings");

    let home = PathBuf::from(std::env::var("HOME").expect("HOME should be set"));
    assert_eq!(settings.snapshot_path, home.join("filtertree-test/snap.json"));
    assert_eq!(settings.definition, Some(home.join("filtertree-test/filters.json")));
}

#[test]
fn given_missing_explicit_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(dir.path().join("absent.toml").as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("broken.toml");
    fs::write(&config_path, "persist = [not a bool").unwrap();

    let err = Settings::load(Some(config_path.as_path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("broken.toml"));
}
