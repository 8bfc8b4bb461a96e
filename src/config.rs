//! Application-level configuration loading, including the activity-type
//! catalog offered when scheduling a game.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::DEFAULT_DURATION_MINUTES;

/// Default location on disk where the library looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCHDAY_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    activity_types: Vec<String>,
    default_duration_minutes: u32,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        activities = app_config.activity_types.len(),
                        "loaded activity catalog from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Activity kinds offered when scheduling a game.
    pub fn activity_types(&self) -> &[String] {
        &self.activity_types
    }

    /// Activity kind assumed when a request leaves the field empty.
    pub fn default_activity(&self) -> &str {
        self.activity_types
            .first()
            .map(String::as_str)
            .unwrap_or("Padel")
    }

    /// Duration assumed when a request leaves the field at zero.
    pub fn default_duration_minutes(&self) -> u32 {
        self.default_duration_minutes
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            activity_types: default_activity_types(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at
/// [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default = "default_activity_types")]
    activity_types: Vec<String>,
    #[serde(default = "default_duration")]
    default_duration_minutes: u32,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            activity_types: value.activity_types,
            default_duration_minutes: value.default_duration_minutes.max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into
/// account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in activity catalog shipped with the library.
fn default_activity_types() -> Vec<String> {
    vec!["Padel".into(), "Tennis".into(), "Squash".into()]
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}
