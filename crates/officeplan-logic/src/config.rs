//! Planner configuration.
//!
//! Settings come from an optional JSON file, then environment overrides.
//! The backend API key is never stored in the file: the config only names
//! the environment variable that holds it.
//!
//! ```
//! use officeplan_logic::config::{validate_config, PlannerConfig};
//!
//! let config = PlannerConfig::from_json(r#"{ "default_floor_width": 30 }"#).unwrap();
//! assert_eq!(config.default_floor_width, 30);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capacity::CapacityThresholds;
use crate::constants::{DEFAULT_FLOOR_LENGTH, DEFAULT_FLOOR_WIDTH};
use crate::scene::SceneConfig;

/// Environment variable overriding [`BackendConfig::url`].
pub const BACKEND_URL_ENV: &str = "OFFICEPLAN_BACKEND_URL";

/// Where the hosted database lives and how to authenticate to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            api_key_env: "OFFICEPLAN_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub backend: BackendConfig,
    /// Size offered for new floors (cells).
    pub default_floor_width: u32,
    pub default_floor_length: u32,
    pub capacity_thresholds: CapacityThresholds,
    pub scene: SceneConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            default_floor_width: DEFAULT_FLOOR_WIDTH,
            default_floor_length: DEFAULT_FLOOR_LENGTH,
            capacity_thresholds: CapacityThresholds::default(),
            scene: SceneConfig::default(),
        }
    }
}

/// Failure to read a config file.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PlannerConfig {
    /// Parse a config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LoadConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read `path`, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;
        config.apply_env();
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
            log::debug!("backend url overridden by {}", BACKEND_URL_ENV);
            self.backend.url = url;
        }
    }

    /// The backend API key from the process environment.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_from(|key| std::env::var(key).ok())
    }

    pub fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(&self.backend.api_key_env).filter(|k| !k.is_empty())
    }
}

/// Config validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("backend url is empty")]
    EmptyBackendUrl,
    #[error("backend url {0:?} is not http(s)")]
    InvalidBackendUrl(String),
    #[error("api key variable name is empty")]
    EmptyApiKeyEnv,
    #[error("default floor size {width}×{length} has a zero dimension")]
    ZeroFloorSize { width: u32, length: u32 },
    #[error("capacity thresholds must satisfy 0 < medium < high <= 1, got {medium} / {high}")]
    InvalidThresholds { medium: f32, high: f32 },
    #[error("scene value {name} must be positive, got {value}")]
    NonPositiveScene { name: &'static str, value: f32 },
}

/// Validate a config, returning every problem found.
pub fn validate_config(config: &PlannerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let url = config.backend.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::EmptyBackendUrl);
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::InvalidBackendUrl(url.to_string()));
    }
    if config.backend.api_key_env.trim().is_empty() {
        errors.push(ConfigError::EmptyApiKeyEnv);
    }

    if config.default_floor_width == 0 || config.default_floor_length == 0 {
        errors.push(ConfigError::ZeroFloorSize {
            width: config.default_floor_width,
            length: config.default_floor_length,
        });
    }

    let CapacityThresholds { medium, high } = config.capacity_thresholds;
    if !(medium > 0.0 && medium < high && high <= 1.0) {
        errors.push(ConfigError::InvalidThresholds { medium, high });
    }

    let scene = &config.scene;
    for (name, value) in [
        ("floor_height", scene.floor_height),
        ("wall_thickness", scene.wall_thickness),
        ("cell_size", scene.cell_size),
    ] {
        if value.is_nan() || value <= 0.0 {
            errors.push(ConfigError::NonPositiveScene { name, value });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&PlannerConfig::default()).is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json(
            r#"{ "backend": { "url": "https://db.example.com" }, "scene": { "cell_size": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "https://db.example.com");
        assert_eq!(config.backend.api_key_env, "OFFICEPLAN_API_KEY");
        assert_eq!(config.scene.cell_size, 0.5);
        assert_eq!(config.scene.floor_height, 3.0);
        assert_eq!(config.default_floor_length, DEFAULT_FLOOR_LENGTH);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            PlannerConfig::from_json("{ nope"),
            Err(LoadConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PlannerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadConfigError::Io { .. }));
    }

    #[test]
    fn env_overrides_url() {
        let mut config = PlannerConfig::default();
        config.apply_env_from(|k| (k == BACKEND_URL_ENV).then(|| "https://other".to_string()));
        assert_eq!(config.backend.url, "https://other");

        // Blank values are ignored.
        config.apply_env_from(|_| Some("  ".to_string()));
        assert_eq!(config.backend.url, "https://other");
    }

    #[test]
    fn api_key_from_named_variable() {
        let mut config = PlannerConfig::default();
        config.backend.api_key_env = "MY_KEY".to_string();
        let lookup = |k: &str| (k == "MY_KEY").then(|| "secret".to_string());
        assert_eq!(config.api_key_from(lookup), Some("secret".to_string()));
        assert_eq!(config.api_key_from(|_| Some(String::new())), None);
    }

    #[test]
    fn validate_collects_everything() {
        let mut config = PlannerConfig::default();
        config.backend.url = "ftp://x".to_string();
        config.backend.api_key_env = " ".to_string();
        config.default_floor_width = 0;
        config.capacity_thresholds.medium = 0.9;
        config.scene.cell_size = 0.0;
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ConfigError::InvalidBackendUrl("ftp://x".to_string())));
        assert!(errors.contains(&ConfigError::EmptyApiKeyEnv));
        assert!(errors.contains(&ConfigError::InvalidThresholds {
            medium: 0.9,
            high: 0.8
        }));
        assert!(errors.contains(&ConfigError::NonPositiveScene {
            name: "cell_size",
            value: 0.0
        }));
    }

    #[test]
    fn nan_thresholds_rejected() {
        let mut config = PlannerConfig::default();
        config.capacity_thresholds.high = f32::NAN;
        assert_eq!(validate_config(&config).len(), 1);
    }
}
