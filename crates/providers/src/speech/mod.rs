//! Speech synthesis with a two-tier provider fallback.
//!
//! The synthesizer tries the primary provider first and, on any failure
//! (missing credential, non-2xx, transport error), logs and tries the
//! fallback with its own voice mapping. Both failing surfaces a single
//! aggregate error naming both attempts. Sequential, never concurrent;
//! no retries beyond the single fallback.

mod elevenlabs;
mod openai;

pub use elevenlabs::ElevenLabsSpeech;
pub use openai::OpenAiSpeech;

use async_trait::async_trait;
use base64::Engine;
use doppel_core::error::SpeechError;
use tracing::{info, warn};

/// A single speech synthesis backend.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider name for logs and the `providerUsed` report.
    fn name(&self) -> &str;

    /// Synthesize `text` with the given logical voice, returning raw
    /// audio bytes (MP3).
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError>;
}

/// A finished synthesis: transport-encoded audio plus which provider
/// actually served it (observability, not a behavioral branch point).
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// Base64-encoded audio bytes.
    pub audio_b64: String,
    /// Name of the provider that produced the audio.
    pub provider: String,
}

/// Primary-then-fallback synthesizer.
pub struct SpeechSynthesizer {
    primary: Box<dyn SpeechProvider>,
    fallback: Box<dyn SpeechProvider>,
}

impl SpeechSynthesizer {
    pub fn new(primary: Box<dyn SpeechProvider>, fallback: Box<dyn SpeechProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Build the production pair from configuration.
    pub fn from_config(config: &doppel_config::SpeechConfig) -> Self {
        Self::new(
            Box::new(ElevenLabsSpeech::new(config.elevenlabs_api_key.clone())),
            Box::new(OpenAiSpeech::new(config.openai_api_key.clone())),
        )
    }

    /// Synthesize `text`, falling back once on primary failure.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Synthesis, SpeechError> {
        match self.primary.synthesize(text, voice).await {
            Ok(audio) => {
                info!(provider = %self.primary.name(), "Speech synthesized");
                Ok(self.encode(audio, self.primary.name()))
            }
            Err(primary_err) => {
                warn!(
                    provider = %self.primary.name(),
                    error = %primary_err,
                    "Primary speech provider failed, trying fallback"
                );

                match self.fallback.synthesize(text, voice).await {
                    Ok(audio) => {
                        info!(provider = %self.fallback.name(), "Speech synthesized via fallback");
                        Ok(self.encode(audio, self.fallback.name()))
                    }
                    Err(fallback_err) => {
                        warn!(
                            provider = %self.fallback.name(),
                            error = %fallback_err,
                            "Fallback speech provider failed"
                        );
                        Err(SpeechError::Exhausted {
                            primary: self.primary.name().to_string(),
                            fallback: self.fallback.name().to_string(),
                        })
                    }
                }
            }
        }
    }

    fn encode(&self, audio: Vec<u8>, provider: &str) -> Synthesis {
        Synthesis {
            audio_b64: base64::engine::general_purpose::STANDARD.encode(audio),
            provider: provider.to_string(),
        }
    }
}
