//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Access log loaded at startup
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("./hn_logs.tsv")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for a single query
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Top-N size used when a request has no `size` parameter
    #[serde(default = "default_top_size")]
    pub default_top_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_top_size() -> usize {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            default_top_size: default_top_size(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Nothing is logged here since tracing is configured from the result;
    /// the caller reports [`LoadedConfig::source`] and the skipped files.
    pub fn load_default() -> LoadedConfig {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("urltally").join("config.toml")),
            Some(PathBuf::from("/etc/urltally/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];
        Self::load_first(config_paths.iter().flatten())
    }

    /// Load the first readable config among `paths`, falling back to defaults
    fn load_first<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(log_file) = std::env::var("URLTALLY_LOG_FILE") {
            self.index.log_file = PathBuf::from(log_file);
        }

        if let Ok(host) = std::env::var("URLTALLY_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("URLTALLY_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(level) = std::env::var("URLTALLY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("URLTALLY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of looking up the configuration in the default locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config was read from, `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Config files that exist but could not be loaded
    pub skipped: Vec<ConfigError>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# urltally Configuration
#
# Environment variables override these settings:
# - URLTALLY_LOG_FILE
# - URLTALLY_API_HOST
# - URLTALLY_API_PORT
# - URLTALLY_LOG_LEVEL
# - URLTALLY_LOG_FORMAT

[index]
# Access log (<date> <time><TAB><url>) loaded at startup
log_file = "./hn_logs.tsv"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

# Query deadline in seconds
request_timeout_secs = 30

# Number of URLs returned by /popular when no size is given
default_top_size = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
