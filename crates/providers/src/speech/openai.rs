//! OpenAI text-to-speech client, used as the fallback tier.

use async_trait::async_trait;
use doppel_core::error::SpeechError;
use serde_json::json;
use tracing::debug;

use super::SpeechProvider;

const API_URL: &str = "https://api.openai.com/v1/audio/speech";
const MODEL: &str = "tts-1";
const PROVIDER_NAME: &str = "openai";

/// The same logical voice names the primary provider accepts, mapped
/// onto OpenAI's voice roster. Unknown names fall back to alloy.
const VOICES: &[(&str, &str)] = &[
    ("Aria", "alloy"),
    ("Roger", "echo"),
    ("Sarah", "nova"),
    ("Laura", "shimmer"),
    ("Charlie", "onyx"),
];

pub struct OpenAiSpeech {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiSpeech {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn voice_name(voice: &str) -> &'static str {
        VOICES
            .iter()
            .find(|(name, _)| *name == voice)
            .map(|(_, mapped)| *mapped)
            .unwrap_or(VOICES[0].1)
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeech {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SpeechError::NotConfigured {
                provider: PROVIDER_NAME.into(),
                reason: "OPENAI_API_KEY is not set".into(),
            }
        })?;

        let mapped = Self::voice_name(voice);

        debug!(voice, mapped, chars = text.len(), "Requesting OpenAI synthesis");

        let response = self
            .client
            .post(API_URL)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": MODEL,
                "input": text,
                "voice": mapped,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| SpeechError::Network {
                provider: PROVIDER_NAME.into(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                provider: PROVIDER_NAME.into(),
                status,
                body,
            });
        }

        let audio = response.bytes().await.map_err(|e| SpeechError::Network {
            provider: PROVIDER_NAME.into(),
            reason: e.to_string(),
        })?;

        Ok(audio.to_vec())
    }
}
