//! Streaming completion gateway client.
//!
//! Sends one request carrying the composed system instruction prepended
//! to the conversation history and hands back the raw event-stream body.
//! Frame extraction belongs to [`crate::sse`]; this layer only maps the
//! HTTP status taxonomy:
//!
//! - 429 → rate limited (retryable, surfaced verbatim, never auto-retried here)
//! - 402 → quota/billing exhausted (fatal for the request)
//! - other non-2xx → generic upstream failure with the body for diagnostics
//! - transport failure → network error

use async_trait::async_trait;
use bytes::Bytes;
use doppel_config::CompletionConfig;
use doppel_core::error::GatewayError;
use doppel_core::message::ChatMessage;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::pin::Pin;
use tracing::{debug, warn};

/// The raw streaming response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, GatewayError>> + Send>>;

/// The completion gateway seam. Lets the turn runner and the HTTP
/// gateway be tested against canned streams.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// One outbound call; returns the raw event-stream body.
    async fn stream_chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<ByteStream, GatewayError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug)]
pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CompletionClient {
    /// Create a new client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Build a client from configuration.
    pub fn from_config(config: &CompletionConfig) -> Result<Self, GatewayError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GatewayError::NotConfigured("completion API key is not set".into()))?;
        Self::new(
            &config.base_url,
            api_key,
            &config.model,
            std::time::Duration::from_secs(config.timeout_secs),
        )
    }

    fn to_api_messages(system_prompt: &str, history: &[ChatMessage]) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ApiMessage {
            role: "system".into(),
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|m| ApiMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));
        messages
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn stream_chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<ByteStream, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(system_prompt, history),
            "stream": true,
        });

        debug!(model = %self.model, turns = history.len(), "Sending streaming completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GatewayError::RateLimited);
        }

        if status == 402 {
            return Err(GatewayError::QuotaExhausted);
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "AI gateway returned error");
            return Err(GatewayError::Api {
                status,
                body: error_body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| GatewayError::StreamInterrupted(e.to_string())));

        Ok(Box::pin(stream))
    }
}

// --- Wire types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use doppel_core::message::ChatMessage;

    #[test]
    fn system_message_is_prepended() {
        let history = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")];
        let messages = CompletionClient::to_api_messages("You are a twin.", &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are a twin.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        let client = CompletionClient::new(
            "https://gw.example.com/v1/",
            "key",
            "model-x",
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://gw.example.com/v1");
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = CompletionConfig::default();
        let err = CompletionClient::from_config(&config).unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }
}
