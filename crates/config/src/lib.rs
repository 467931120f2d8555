//! Configuration loading, validation, and management for Doppel.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides for secrets. Validates settings at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Streaming completion gateway settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Speech synthesis settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Completion gateway configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// API key for the completion gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_completion_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_completion_url() -> String {
    "https://ai.gateway.lovable.dev/v1".into()
}
fn default_model() -> String {
    "google/gemini-2.5-flash".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Speech synthesis configuration (primary + fallback providers).
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// ElevenLabs API key (primary provider).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,

    /// OpenAI API key (fallback provider).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Logical voice requested by default.
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Whether assistant replies are vocalized at all.
    #[serde(default = "default_true")]
    pub voice_enabled: bool,
}

fn default_voice() -> String {
    "Aria".into()
}
fn default_true() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            openai_api_key: None,
            default_voice: default_voice(),
            voice_enabled: true,
        }
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("completion", &self.completion)
            .field("speech", &self.speech)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("elevenlabs_api_key", &redact(&self.elevenlabs_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("default_voice", &self.default_voice)
            .field("voice_enabled", &self.voice_enabled)
            .finish()
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a config purely from defaults + environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Secrets always win from the environment when present.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("DOPPEL_COMPLETION_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("DOPPEL_ELEVENLABS_API_KEY") {
            self.speech.elevenlabs_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("DOPPEL_OPENAI_API_KEY") {
            self.speech.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DOPPEL_COMPLETION_URL") {
            self.completion.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.completion.model, "google/gemini-2.5-flash");
        assert_eq!(config.speech.default_voice, "Aria");
        assert!(config.speech.voice_enabled);
        assert_eq!(config.gateway.port, 8787);
    }

    #[test]
    fn loads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[completion]
model = "gpt-4o-mini"

[speech]
default_voice = "Sarah"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.speech.default_voice, "Sarah");
        // untouched sections keep defaults
        assert_eq!(config.completion.timeout_secs, 120);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            completion: CompletionConfig {
                api_key: Some("sk-very-secret".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
