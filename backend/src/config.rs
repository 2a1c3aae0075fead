//! Application configuration file support.
//!
//! Settings are read from a TOML file in which every section and key is
//! optional, then `HOST` and `PORT` from the environment override the server
//! address.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [pipeline]
//! depth_threshold = 0.001
//! min_duration_samples = 3
//! normalize_window = 51
//!
//! [limits]
//! max_input_bytes = 52428800
//! max_retained_jobs = 256
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::algorithms::{DEFAULT_DEPTH_THRESHOLD, DEFAULT_MIN_DURATION_SAMPLES};
use crate::services::job_tracker::DEFAULT_JOB_CAPACITY;
use crate::services::pipeline::PipelineOptions;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "EXO_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub pipeline: PipelineDefaults,
    #[serde(default)]
    pub limits: LimitSettings,
}

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Detection parameters used when a request leaves them unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefaults {
    #[serde(default = "default_depth_threshold")]
    pub depth_threshold: f64,
    #[serde(default = "default_min_duration_samples")]
    pub min_duration_samples: usize,
    /// Rolling-median width; derived from the cadence when absent.
    #[serde(default)]
    pub normalize_window: Option<usize>,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            depth_threshold: default_depth_threshold(),
            min_duration_samples: default_min_duration_samples(),
            normalize_window: None,
        }
    }
}

/// Input size and memory ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Background jobs kept for status queries; oldest finished go first.
    #[serde(default = "default_max_retained_jobs")]
    pub max_retained_jobs: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_retained_jobs: default_max_retained_jobs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_depth_threshold() -> f64 {
    DEFAULT_DEPTH_THRESHOLD
}

fn default_min_duration_samples() -> usize {
    DEFAULT_MIN_DURATION_SAMPLES
}

fn default_max_input_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_max_retained_jobs() -> usize {
    DEFAULT_JOB_CAPACITY
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `EXO_CONFIG`, or defaults when unset,
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override the bind address from `HOST` and `PORT`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("PORT must be a valid port number, got {:?}", port))
            })?;
        }
        Ok(())
    }

    /// Check the pipeline defaults and limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline
            .as_options()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[pipeline] {}", e)))?;

        if self.limits.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "[limits] max_input_bytes must be positive".to_string(),
            ));
        }
        if self.limits.max_retained_jobs == 0 {
            return Err(ConfigError::Invalid(
                "[limits] max_retained_jobs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PipelineDefaults {
    /// The defaults expressed as fully specified request options.
    pub fn as_options(&self) -> PipelineOptions {
        PipelineOptions {
            depth_threshold: Some(self.depth_threshold),
            min_duration_samples: Some(self.min_duration_samples),
            normalize_window: self.normalize_window,
        }
    }
}
