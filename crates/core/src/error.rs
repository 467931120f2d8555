//! Error types for the Doppel domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Doppel operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion gateway errors ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Speech synthesis errors ---
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    // --- Context store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the streaming completion gateway.
///
/// 429 and 402 are distinguished from generic upstream failures so the
/// caller can explain the specific cause to the user.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Rate limits exceeded, please try again later")]
    RateLimited,

    #[error("Payment required, quota exhausted for this workspace")]
    QuotaExhausted,

    #[error("AI gateway error: {body} (status: {status})")]
    Api { status: u16, body: String },

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the dual-provider speech synthesis client.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    #[error("{provider} is not configured: {reason}")]
    NotConfigured { provider: String, reason: String },

    #[error("{provider} API error: {body} (status: {status})")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Network error from {provider}: {reason}")]
    Network { provider: String, reason: String },

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("All speech providers failed: {primary}, then {fallback}")]
    Exhausted { primary: String, fallback: String },
}

/// Errors from the context store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_displays_correctly() {
        let err = Error::Gateway(GatewayError::Api {
            status: 500,
            body: "upstream exploded".into(),
        });
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn rate_limit_is_user_readable() {
        let err = GatewayError::RateLimited;
        assert!(err.to_string().contains("try again later"));
    }

    #[test]
    fn exhausted_names_both_attempts() {
        let err = SpeechError::Exhausted {
            primary: "elevenlabs".into(),
            fallback: "openai".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("elevenlabs"));
        assert!(msg.contains("openai"));
    }
}
