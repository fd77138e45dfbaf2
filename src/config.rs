//! File configuration for the tutoring session.
//!
//! A single optional TOML file covers the remote completion service and
//! the simulated-thinking delay of the canned responder. Every field has
//! a default, so an absent file (the common demo case) just yields
//! [`TutorConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Chat-completions endpoint of the remote service.
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    /// Maximum wait for one resolution before the fallback reply.
    pub timeout_secs: u64,
    /// Simulated thinking delay of the canned responder.
    pub thinking_delay_ms: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        TutorConfig {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            presence_penalty: 0.6,
            frequency_penalty: 0.3,
            timeout_secs: 15,
            thinking_delay_ms: 1500,
        }
    }
}

impl TutorConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

/// Config loading failures. A missing file is not one of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Unreadable or malformed files are startup errors.
pub fn load(path: &Path) -> Result<TutorConfig, ConfigError> {
    if !path.exists() {
        return Ok(TutorConfig::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}
