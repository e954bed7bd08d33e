//! Runtime settings shared by the AI client and the CLI.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::floor::ContingencyFactor;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Low temperature keeps the suggested amounts stable between runs.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u8 = 1;

/// Explicitly constructed configuration, passed to whatever needs it.
#[derive(Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Retries after a transient failure: 0 or 1.
    pub max_retries: u8,
    pub contingency_factor: ContingencyFactor,
}

impl Settings {
    /// Check invariants that clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries > 1 {
            return Err(ConfigError::InvalidRetryCount(self.max_retries));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// The API credential, or a [`ConfigError::MissingCredential`].
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            contingency_factor: ContingencyFactor::default(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("contingency_factor", &self.contingency_factor)
            .finish()
    }
}
