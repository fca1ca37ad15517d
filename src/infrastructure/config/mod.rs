use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::{debug, warn};

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::security::keyring::KeyringManager;

pub const DEFAULT_CONFIG_FILE: &str = "review-voc.toml";
pub const ENV_PREFIX: &str = "REVIEW_VOC_";
const KEYRING_SERVICE: &str = "review-voc";
const KEYRING_ENTRY: &str = "openai";

pub struct ConfigService {
    keyring: KeyringManager,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            keyring: KeyringManager::new(KEYRING_SERVICE),
        }
    }

    /// Layered sources, lowest precedence first: built-in defaults,
    /// `GLM_API_KEY`/`OPENAI_*` variables, the TOML file, `REVIEW_VOC_*` variables.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(env_alias("GLM_API_KEY", "llm.api_key"))
            .merge(env_alias("OPENAI_API_KEY", "llm.api_key"))
            .merge(env_alias("OPENAI_BASE_URL", "llm.base_url"))
            .merge(env_alias("OPENAI_MODEL", "llm.model"))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate the configuration, filling the API key from the
    /// keyring when no other source provides one.
    pub fn load(&self, path: Option<&Path>) -> Result<AppConfig> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "Failed to read .env file");
            }
        }

        if let Some(path) = path {
            if !path.is_file() {
                return Err(AppError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut config: AppConfig = Self::figment(path).extract()?;

        if config.llm.api_key.is_none() {
            match self.keyring.get_secret(KEYRING_ENTRY) {
                Ok(Some(key)) => {
                    debug!("API key loaded from keyring");
                    config.llm.api_key = Some(key);
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Keyring unavailable"),
            }
        }

        config.check()?;
        Ok(config)
    }

    pub fn save_api_key(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(AppError::ValidationError("API key is empty".to_string()));
        }
        self.keyring.set_secret(KEYRING_ENTRY, key.trim())
    }

    pub fn delete_api_key(&self) -> Result<()> {
        self.keyring.delete_secret(KEYRING_ENTRY)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// A single un-prefixed variable mapped onto a config key.
fn env_alias(var: &'static str, key: &'static str) -> Env {
    Env::raw()
        .filter_map(move |name| name.as_str().eq_ignore_ascii_case(var).then(|| key.into()))
}
