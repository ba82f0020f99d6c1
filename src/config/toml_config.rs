use crate::domain::category::CategorySet;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LinkerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "receipt_statement_linker";
pub const CONFIG_FILE: &str = "config.toml";

/// Application settings, loaded once at startup and handed to the components
/// that need them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub categorization_notes: Option<String>,
    pub transcription_model: String,
    pub categorization_model: String,
    pub matching_model: String,
    pub categories: Option<Vec<String>>,
    pub api_base: String,
    pub api_key_env: String,
    pub request_timeout_seconds: u64,
    pub concurrent_requests: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            categorization_notes: None,
            transcription_model: "gemini-2.5-flash".to_string(),
            categorization_model: "gemini-2.5-flash-lite".to_string(),
            matching_model: "gemini-2.5-flash".to_string(),
            categories: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_seconds: 120,
            concurrent_requests: 4,
        }
    }
}

impl AppConfig {
    /// `$XDG_CONFIG_HOME/receipt_statement_linker/config.toml`, or the same
    /// under `~/.config` when the variable is unset.
    pub fn default_path() -> Result<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .map(|home| home.join(".config"))
                .ok_or_else(|| LinkerError::MissingConfigError {
                    field: "home directory".to_string(),
                })?,
        };
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LinkerError::ConfigError {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Loads the config at `path`, creating its directory if needed. A missing
    /// or unreadable file is not fatal: it is logged and defaults are used.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Could not create config directory {}: {}", parent.display(), e);
            }
        }

        match Self::from_file(path) {
            Ok(config) => {
                tracing::debug!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Config file parsing failed ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LinkerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }

    pub fn category_set(&self) -> CategorySet {
        CategorySet::from_config(self.categories.as_deref())
    }
}

impl ConfigProvider for AppConfig {
    fn transcription_model(&self) -> &str {
        &self.transcription_model
    }

    fn matching_model(&self) -> &str {
        &self.matching_model
    }

    fn categorization_model(&self) -> &str {
        &self.categorization_model
    }

    fn categorization_notes(&self) -> Option<&str> {
        self.categorization_notes.as_deref()
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base", &self.api_base)?;
        validation::validate_non_empty_string("transcription_model", &self.transcription_model)?;
        validation::validate_non_empty_string("categorization_model", &self.categorization_model)?;
        validation::validate_non_empty_string("matching_model", &self.matching_model)?;
        validation::validate_non_empty_string("api_key_env", &self.api_key_env)?;
        validation::validate_range("request_timeout_seconds", self.request_timeout_seconds, 1, 3600)?;
        validation::validate_range("concurrent_requests", self.concurrent_requests, 1, 32)?;
        Ok(())
    }
}
