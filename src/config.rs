//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::index::TimestampPolicy;
use crate::storage::MAX_POST_CHARS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Index engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_max_post_chars")]
    pub max_post_chars: usize,

    #[serde(default)]
    pub timestamp_policy: TimestampPolicy,

    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_max_post_chars() -> usize {
    MAX_POST_CHARS
}

fn default_event_buffer() -> usize {
    1024
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_post_chars: default_max_post_chars(),
            timestamp_policy: TimestampPolicy::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Synthetic workload configuration (used by `yodelr perf`)
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    #[serde(default = "default_words")]
    pub words: usize,

    #[serde(default = "default_users")]
    pub users: Vec<String>,

    #[serde(default = "default_topic_ratio")]
    pub topic_ratio: f64,

    pub seed: Option<u64>,
}

fn default_words() -> usize {
    2000
}

fn default_users() -> Vec<String> {
    vec!["u1".to_string(), "u2".to_string(), "u3".to_string()]
}

fn default_topic_ratio() -> f64 {
    // Two faces out of six
    2.0 / 6.0
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            words: default_words(),
            users: default_users(),
            topic_ratio: default_topic_ratio(),
            seed: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

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

impl LoggingConfig {
    /// Whether the JSON formatter was requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
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
        let (config, source) = Self::resolve_from(&[]);
        source.log();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let (config, source) = Self::resolve(Some(path))?;
        source.log();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let (config, source) = Self::load_default_quiet();
        source.log();
        config
    }

    /// Resolve the config without logging
    ///
    /// An explicit path must load. Without one the standard locations are
    /// tried in order and the first that loads wins. Callers log the returned
    /// `ConfigSource` once a subscriber is installed.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        match explicit {
            Some(path) => {
                let mut config = Self::load(path)?;
                let ignored_env = config.apply_env_overrides();
                let source = ConfigSource {
                    path: Some(path.to_path_buf()),
                    skipped: Vec::new(),
                    ignored_env,
                };
                Ok((config, source))
            }
            None => Ok(Self::load_default_quiet()),
        }
    }

    fn load_default_quiet() -> (Self, ConfigSource) {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("yodelr").join("config.toml")),
            Some(PathBuf::from("/etc/yodelr/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::resolve_from(&config_paths)
    }

    fn resolve_from(candidates: &[PathBuf]) -> (Self, ConfigSource) {
        let mut source = ConfigSource::default();
        let mut loaded = None;

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load(path) {
                Ok(config) => {
                    source.path = Some(path.clone());
                    loaded = Some(config);
                    break;
                }
                Err(e) => source.skipped.push((path.clone(), e.to_string())),
            }
        }

        let mut config = loaded.unwrap_or_default();
        source.ignored_env = config.apply_env_overrides();
        (config, source)
    }

    /// Apply environment variable overrides, returning the ones that were ignored
    fn apply_env_overrides(&mut self) -> Vec<String> {
        let mut ignored = Vec::new();

        // Index overrides
        if let Ok(max) = std::env::var("YODELR_MAX_POST_CHARS") {
            match max.parse() {
                Ok(n) => self.index.max_post_chars = n,
                Err(e) => ignored.push(format!("Ignoring YODELR_MAX_POST_CHARS: {}", e)),
            }
        }
        if let Ok(policy) = std::env::var("YODELR_TIMESTAMP_POLICY") {
            match policy.parse() {
                Ok(p) => self.index.timestamp_policy = p,
                Err(e) => ignored.push(format!("Ignoring YODELR_TIMESTAMP_POLICY: {}", e)),
            }
        }
        if let Ok(buffer) = std::env::var("YODELR_EVENT_BUFFER") {
            match buffer.parse() {
                Ok(n) => self.index.event_buffer = n,
                Err(e) => ignored.push(format!("Ignoring YODELR_EVENT_BUFFER: {}", e)),
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("YODELR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("YODELR_LOG_FORMAT") {
            self.logging.format = format;
        }

        ignored
    }
}

/// Where a resolved config came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    /// File the config was read from, `None` when only defaults apply
    pub path: Option<PathBuf>,
    /// Candidate files that exist but failed to load
    pub skipped: Vec<(PathBuf, String)>,
    /// Environment overrides that could not be parsed
    pub ignored_env: Vec<String>,
}

impl ConfigSource {
    /// Report the resolution through `tracing`
    pub fn log(&self) {
        for (path, error) in &self.skipped {
            tracing::warn!("Failed to load config from {:?}: {}", path, error);
        }
        for message in &self.ignored_env {
            tracing::warn!("{}", message);
        }
        match &self.path {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
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
    r#"# Yodelr Configuration
#
# Environment variables override these settings:
# - YODELR_MAX_POST_CHARS
# - YODELR_TIMESTAMP_POLICY
# - YODELR_EVENT_BUFFER
# - YODELR_LOG_LEVEL
# - YODELR_LOG_FORMAT

[index]
# Posts longer than this are truncated before indexing (characters)
max_post_chars = 140

# Posts sharing a timestamp: "last_writer_wins" or "keep_all"
timestamp_policy = "last_writer_wins"

# Number of index events kept for `--events`
event_buffer = 1024

[workload]
# Words generated for `yodelr perf`
words = 2000

# Authors picked at random for generated posts
users = ["u1", "u2", "u3"]

# Fraction of generated words turned into #topics
topic_ratio = 0.3333

# Fixed seed for reproducible workloads (omit for a random one)
# seed = 42

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
