use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Keys accepted by `evoke config get` / `evoke config set`.
pub const KEYS: [&str; 4] = [
    "data_dir",
    "ml_service_url",
    "ml_timeout_secs",
    "health_timeout_secs",
];

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "evoke";

/// Configuration for evoke.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (EVOKE_* prefix)
/// 3. Config file (~/.config/evoke/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding images.json, directions.json and demo.json.
    ///
    /// Can be set via:
    /// - CLI: --data-dir /path/to/data
    /// - ENV: EVOKE_DATA_DIR
    /// - Config: data_dir = "/path/to/data"
    /// - Default: ~/.local/share/evoke/data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the audio embedding model service.
    ///
    /// Can be set via:
    /// - CLI: --ml-url http://host:port
    /// - ENV: EVOKE_ML_SERVICE_URL
    /// - Config: ml_service_url = "http://host:port"
    #[serde(default = "default_ml_service_url")]
    pub ml_service_url: String,

    /// Timeout for a single analyze call, in seconds.
    #[serde(default = "default_ml_timeout_secs", deserialize_with = "deserialize_secs")]
    pub ml_timeout_secs: u64,

    /// Timeout for the model health probe, in seconds.
    #[serde(default = "default_health_timeout_secs", deserialize_with = "deserialize_secs")]
    pub health_timeout_secs: u64,

    /// Logger settings, passed to twyg at start-up.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ml_service_url: default_ml_service_url(),
            ml_timeout_secs: default_ml_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/evoke/config.toml
    /// Reads environment variables with EVOKE_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path(), ENV_PREFIX)
    }

    /// Load from a specific config file and environment prefix.
    ///
    /// A missing file is skipped. Variables are read as `<PREFIX>_<KEY>`.
    pub fn load_from(config_path: &Path, env_prefix: &str) -> Result<Self> {
        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level(env_prefix);
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, then apply CLI overrides.
    pub fn load_with_overrides(data_dir: Option<PathBuf>, ml_service_url: Option<String>) -> Result<Self> {
        Ok(Self::load()?.with_overrides(data_dir, ml_service_url))
    }

    /// Replace the values given on the command line.
    #[must_use]
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, ml_service_url: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(url) = ml_service_url {
            self.ml_service_url = url;
        }
        self
    }

    #[must_use]
    pub const fn ml_timeout(&self) -> Duration {
        Duration::from_secs(self.ml_timeout_secs)
    }

    #[must_use]
    pub const fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// The value of a single key, rendered for display.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "ml_service_url" => Some(self.ml_service_url.clone()),
            "ml_timeout_secs" => Some(self.ml_timeout_secs.to_string()),
            "health_timeout_secs" => Some(self.health_timeout_secs.to_string()),
            _ => None,
        }
    }
}

/// Get the default dataset directory.
///
/// Returns: ~/.local/share/evoke/data (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evoke")
        .join("data")
}

fn default_ml_service_url() -> String {
    "http://localhost:8000".to_string()
}

/// Environment values always arrive as strings, so accept `45` and `"45"`.
fn deserialize_secs<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Secs {
        Number(u64),
        Text(String),
    }

    match Secs::deserialize(deserializer)? {
        Secs::Number(secs) => Ok(secs),
        Secs::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected a number of seconds, got {:?}", text))
        }),
    }
}

const fn default_ml_timeout_secs() -> u64 {
    30
}

const fn default_health_timeout_secs() -> u64 {
    5
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/evoke/config.toml
/// - macOS: ~/Library/Application Support/evoke/config.toml
/// - Windows: %APPDATA%\evoke\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evoke")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Evoke Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (EVOKE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Base URL of the audio embedding model service
#
# The service must expose POST /analyze (multipart field "audio") and
# GET /health.
#
# Can also be set via:
# - CLI: evoke --ml-url http://host:8000 analyze clip.mp3
# - Environment: EVOKE_ML_SERVICE_URL=http://host:8000
ml_service_url = "http://localhost:8000"

# Timeout for a single analyze call, in seconds. Calls are never retried.
ml_timeout_secs = 30

# Timeout for the model health probe, in seconds.
health_timeout_secs = 5

# Directory holding the precomputed dataset:
# images.json, directions.json and (optionally) demo.json
#
# Can also be set via:
# - CLI: evoke --data-dir /custom/data status
# - Environment: EVOKE_DATA_DIR=/custom/data
#
# Default: Platform-specific data directory
#data_dir = "/path/to/evoke/data"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}
