use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_CODEFORMER_VERSION, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REPLICATE_API_BASE, DEFAULT_TELEGRAM_API_BASE, ENV_REPLICATE_TOKEN, ENV_TELEGRAM_TOKEN,
};
use crate::error::{PhotozoneError, Result};
use crate::io::naming::StagingDirs;

/// Process-wide configuration, built once at startup and passed down.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token. Usually supplied through `TELEGRAM_TOKEN`.
    #[serde(default)]
    pub telegram_token: String,
    /// Replicate API token. Usually supplied through `REPLICATE_API_TOKEN`.
    #[serde(default)]
    pub replicate_token: String,
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
    #[serde(default)]
    pub restore: RestoreConfig,
}

/// Endpoint settings of the remote face restoration call. The model
/// parameters themselves are fixed, see `consts::RESTORE_FIDELITY`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestoreConfig {
    pub api_base: String,
    pub model_version: String,
    pub poll_interval_ms: u64,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_REPLICATE_API_BASE.to_string(),
            model_version: DEFAULT_CODEFORMER_VERSION.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_DIR)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_telegram_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            replicate_token: String::new(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            telegram_api_base: default_telegram_api_base(),
            restore: RestoreConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration: optional TOML file, then `.env`, then the process
    /// environment. Environment values win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "Loaded .env file");
        }

        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&contents)?;
                info!(path = %path.display(), "Loaded config file");
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| PhotozoneError::Config(e.to_string()))
    }

    /// Override the secrets with values returned by `lookup`, ignoring empty ones.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.telegram_token = token;
        }
        if let Some(token) = lookup(ENV_REPLICATE_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.replicate_token = token;
        }
    }

    /// Reject configurations the bot cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(PhotozoneError::Config(format!(
                "{ENV_TELEGRAM_TOKEN} not found in the environment"
            )));
        }
        self.validate_restore()
    }

    /// Checks only what the pipeline itself needs (no bot token).
    pub fn validate_restore(&self) -> Result<()> {
        if self.replicate_token.trim().is_empty() {
            return Err(PhotozoneError::Config(format!(
                "{ENV_REPLICATE_TOKEN} not found in the environment"
            )));
        }
        if self.restore.poll_interval_ms == 0 {
            return Err(PhotozoneError::Config(
                "restore.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Create the staging directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.input_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    pub fn staging_dirs(&self) -> StagingDirs {
        StagingDirs::new(self.input_dir.clone(), self.output_dir.clone())
    }
}
