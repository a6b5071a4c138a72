//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/filtertree/filtertree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `FILTERTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, CONFIDENCE_THRESHOLD_ID};

/// Host-side mapping from node ids to external effects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HooksConfig {
    /// Node whose numeric value is the detection confidence threshold
    pub threshold_control: String,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            threshold_control: CONFIDENCE_THRESHOLD_ID.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub snapshot_path: Option<PathBuf>,
    pub definition: Option<PathBuf>,
    pub persist: Option<bool>,
    pub hooks: RawHooksConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHooksConfig {
    pub threshold_control: Option<String>,
}

/// Unified configuration for filtertree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where the current tree snapshot is kept
    pub snapshot_path: PathBuf,
    /// Tree definition file (JSON or TOML); the bundled definition when unset
    pub definition: Option<PathBuf>,
    /// Save snapshots after each change
    pub persist: bool,
    pub hooks: HooksConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            definition: None,
            persist: true,
            hooks: HooksConfig::default(),
        }
    }
}

/// Default snapshot location in the platform data directory.
fn default_snapshot_path() -> PathBuf {
    ProjectDirs::from("", "", "filtertree")
        .map(|dirs| dirs.data_dir().join("snapshot.json"))
        .unwrap_or_else(|| PathBuf::from("~/.filtertree/snapshot.json"))
}

/// Get the XDG config directory for filtertree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "filtertree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("filtertree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is returned as is.
pub fn expand_path(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    shellexpand::full(s.as_ref())
        .map(|e| PathBuf::from(e.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn expand_paths(&mut self) {
        self.snapshot_path = expand_path(&self.snapshot_path);
        self.definition = self.definition.as_deref().map(expand_path);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            snapshot_path: overlay
                .snapshot_path
                .clone()
                .unwrap_or_else(|| self.snapshot_path.clone()),
            definition: overlay.definition.clone().or_else(|| self.definition.clone()),
            persist: overlay.persist.unwrap_or(self.persist),
            hooks: HooksConfig {
                threshold_control: overlay
                    .hooks
                    .threshold_control
                    .clone()
                    .unwrap_or_else(|| self.hooks.threshold_control.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            debug!("explicit config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply FILTERTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("FILTERTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("snapshot_path") {
            settings.snapshot_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("definition") {
            settings.definition = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("persist") {
            settings.persist = val;
        }
        if let Ok(val) = config.get_string("hooks.threshold_control") {
            settings.hooks.threshold_control = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# filtertree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/filtertree/filtertree.toml
#   Explicit: --config <file>
#   Env:      FILTERTREE_* environment variables (nested keys use __)

# Snapshot of the current filter selection
# snapshot_path = "~/.local/share/filtertree/snapshot.json"

# Tree definition (JSON array or TOML [[nodes]]); bundled default when unset
# definition = "~/filters.toml"

# Save a snapshot after every change
# persist = true

[hooks]
# Slider whose value is the minimum detection confidence
# threshold_control = "confidence-threshold"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_snapshot_is_json_and_persisting() {
        let settings = Settings::default();
        assert!(settings.snapshot_path.ends_with("snapshot.json"));
        assert!(settings.persist);
        assert_eq!(settings.hooks.threshold_control, CONFIDENCE_THRESHOLD_ID);
        assert!(settings.definition.is_none());
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            snapshot_path: Some(PathBuf::from("/tmp/s.json")),
            definition: None,
            persist: Some(false),
            hooks: RawHooksConfig {
                threshold_control: None,
            },
        };

        let merged = base.merge_with(&overlay);
        assert_eq!(merged.snapshot_path, PathBuf::from("/tmp/s.json"));
        assert!(!merged.persist);
        assert_eq!(merged.definition, None);
        assert_eq!(merged.hooks.threshold_control, CONFIDENCE_THRESHOLD_ID);
    }

    #[test]
    fn given_tilde_in_paths_when_expanding_then_uses_home() {
        let mut settings = Settings {
            snapshot_path: PathBuf::from("~/snap.json"),
            definition: Some(PathBuf::from("$HOME/defs.toml")),
            ..Settings::default()
        };
        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.snapshot_path.starts_with(&home));
        assert!(settings.definition.unwrap().starts_with(&home));
    }

    #[test]
    fn given_settings_when_rendered_then_toml_parses_back() {
        let settings = Settings::default();
        let rendered = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, settings);
        assert!(toml::from_str::<RawSettings>(&Settings::template()).is_ok());
    }
}
