//! ElevenLabs text-to-speech client.

use async_trait::async_trait;
use doppel_core::error::SpeechError;
use serde_json::json;
use tracing::debug;

use super::SpeechProvider;

const API_BASE: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_turbo_v2_5";
const PROVIDER_NAME: &str = "elevenlabs";

/// Logical voice names mapped to ElevenLabs voice IDs. Unknown names
/// fall back to the first entry (Aria).
const VOICE_IDS: &[(&str, &str)] = &[
    ("Aria", "9BWtsMINqrJLrRacOk9x"),
    ("Roger", "CwhRBWXzGAHq8TQ4Fs17"),
    ("Sarah", "EXAVITQu4vr4xnSDxMaL"),
    ("Laura", "FGY2WhTYpPnrIDTdsKH5"),
    ("Charlie", "IKne3meq5aSn9XLyUdCD"),
];

pub struct ElevenLabsSpeech {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn voice_id(voice: &str) -> &'static str {
        VOICE_IDS
            .iter()
            .find(|(name, _)| *name == voice)
            .map(|(_, id)| *id)
            .unwrap_or(VOICE_IDS[0].1)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SpeechError::NotConfigured {
                provider: PROVIDER_NAME.into(),
                reason: "ELEVENLABS_API_KEY is not set".into(),
            }
        })?;

        let voice_id = Self::voice_id(voice);
        let url = format!("{API_BASE}/text-to-speech/{voice_id}");

        debug!(voice, voice_id, chars = text.len(), "Requesting ElevenLabs synthesis");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "audio/mpeg")
            .json(&json!({
                "text": text,
                "model_id": MODEL_ID,
                "voice_settings": {
                    "stability": 0.5,
                    "similarity_boost": 0.75,
                },
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
