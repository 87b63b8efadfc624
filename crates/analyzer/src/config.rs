//! Analyzer configuration, resolved once at startup.

use crate::error::ConfigError;
use std::path::Path;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable overriding the model identifier.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Environment variable overriding the API base URL.
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// API credential. Checked only when an analysis is requested.
    pub api_key: Option<String>,
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Base URL of the Generative Language API.
    pub api_base: String,
}

impl AnalyzerConfig {
    /// Create a configuration with default model and endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Load `.env` from the working directory (if any), then read the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => log::debug!("No .env file found"),
            Err(e) => {
                return Err(ConfigError::EnvFile {
                    path: ".env".into(),
                    source: e,
                });
            }
        }

        Ok(Self::from_lookup(|name| std::env::var(name).ok()))
    }

    /// Load the given environment file, then read the process environment.
    ///
    /// Variables already set in the process take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded environment from {}", path.display());

        Ok(Self::from_lookup(|name| std::env::var(name).ok()))
    }

    /// Build a configuration from a variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new(read(API_KEY_VAR));
        if let Some(model) = read(MODEL_VAR) {
            config.model = model;
        }
        if let Some(api_base) = read(API_BASE_VAR) {
            config.api_base = api_base;
        }
        config
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The API credential, or a fatal configuration error when unset.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new(None)
    }
}
