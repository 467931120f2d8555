//! The chat turn runner.

use std::sync::Arc;

use doppel_core::error::{Error, SpeechError};
use doppel_core::message::ChatMessage;
use doppel_core::store::ContextStore;
use doppel_prompt::{ComposeInput, compose};
use doppel_providers::completion::CompletionBackend;
use doppel_providers::speech::{SpeechSynthesizer, Synthesis};
use doppel_providers::sse::SseLineDecoder;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::playback::{AudioSink, PlaybackHandle, PlaybackSlot};
use crate::transcript::Transcript;

/// The result of one completed turn.
///
/// Speech is best-effort: a turn whose text streamed cleanly succeeds
/// even when synthesis failed, and the failure is reported alongside.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The assistant's full reply text.
    pub content: String,
    /// The synthesized audio, when voice was enabled and synthesis
    /// succeeded.
    pub speech: Option<Synthesis>,
    /// The synthesis failure, when voice was enabled and it did not.
    pub speech_error: Option<SpeechError>,
}

/// Orchestrates conversation turns against the store, the completion
/// gateway, and the speech providers.
pub struct ChatSession {
    store: Arc<dyn ContextStore>,
    backend: Arc<dyn CompletionBackend>,
    speech: Option<SpeechSynthesizer>,
    sink: Option<Box<dyn AudioSink>>,
    playback: PlaybackSlot<Box<dyn PlaybackHandle>>,
    transcript: Transcript,
    voice: String,
    voice_enabled: bool,
}

impl ChatSession {
    pub fn new(store: Arc<dyn ContextStore>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            store,
            backend,
            speech: None,
            sink: None,
            playback: PlaybackSlot::new(),
            transcript: Transcript::new(),
            voice: "Aria".to_string(),
            voice_enabled: true,
        }
    }

    /// Enable spoken replies with the given synthesizer and voice.
    pub fn with_speech(mut self, speech: SpeechSynthesizer, voice: impl Into<String>) -> Self {
        self.speech = Some(speech);
        self.voice = voice.into();
        self
    }

    /// Route synthesized audio to a playback sink.
    pub fn with_audio_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Seed the in-flight transcript from persisted history.
    pub async fn resume(&mut self, user_id: &str) -> Result<(), Error> {
        let history = self.store.chat_history(user_id).await?;
        self.transcript = Transcript::from_history(history);
        Ok(())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    /// Toggle voice. Disabling mid-reply stops any in-flight playback.
    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.voice_enabled = enabled;
        if !enabled {
            self.playback.stop();
        }
    }

    /// Run one conversation turn.
    ///
    /// The user message is persisted up front. The assistant reply is
    /// persisted only after the stream completes cleanly with non-empty
    /// content; a failed stream leaves history without an assistant
    /// record and removes the partial entry from the transcript.
    pub async fn send(&mut self, user_id: &str, text: &str) -> Result<TurnOutcome, Error> {
        self.store
            .append_message(user_id, ChatMessage::user(text))
            .await?;
        self.transcript.push_user(text);

        let persona = self.store.persona(user_id).await?;
        let memories = self.store.memory_facts(user_id).await?;
        let documents = self.store.knowledge_documents(user_id).await?;
        let goals = self.store.active_goals(user_id).await?;

        let proactive_enabled = persona
            .as_ref()
            .map(|p| p.proactive_suggestions_enabled)
            .unwrap_or(true);

        let system_prompt = compose(&ComposeInput {
            persona: persona.as_ref(),
            memories: &memories,
            documents: &documents,
            goals: &goals,
            proactive_enabled,
        });

        let history = self.store.chat_history(user_id).await?;

        debug!(
            user_id,
            facts = memories.len(),
            documents = documents.len(),
            goals = goals.len(),
            turns = history.len(),
            "Starting chat turn"
        );

        let mut stream = self.backend.stream_chat(&system_prompt, &history).await?;
        let mut decoder = SseLineDecoder::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for fragment in decoder.push(&bytes) {
                        self.transcript.apply_delta(&fragment);
                    }
                    if decoder.is_done() {
                        break;
                    }
                }
                Err(e) => {
                    // Half-written replies are neither shown as final
                    // nor persisted.
                    self.transcript.discard_partial_assistant();
                    return Err(e.into());
                }
            }
        }

        let content = self
            .transcript
            .last_assistant_content()
            .unwrap_or_default()
            .to_string();

        if !content.is_empty() {
            self.store
                .append_message(user_id, ChatMessage::assistant(content.clone()))
                .await?;
        }

        let (speech, speech_error) = self.speak(&content).await;

        Ok(TurnOutcome {
            content,
            speech,
            speech_error,
        })
    }

    /// Synthesize and play the reply. Runs strictly after streaming and
    /// never fails the turn.
    async fn speak(&mut self, content: &str) -> (Option<Synthesis>, Option<SpeechError>) {
        if !self.voice_enabled || content.is_empty() {
            return (None, None);
        }
        let Some(synth) = &self.speech else {
            return (None, None);
        };

        match synth.synthesize(content, &self.voice).await {
            Ok(synthesis) => {
                if let Some(sink) = &self.sink {
                    use base64::Engine;
                    match base64::engine::general_purpose::STANDARD.decode(&synthesis.audio_b64) {
                        Ok(audio) => self.playback.start(sink.play(audio)),
                        Err(e) => {
                            return (
                                Some(synthesis),
                                Some(SpeechError::Decode(e.to_string())),
                            );
                        }
                    }
                }
                (Some(synthesis), None)
            }
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed, continuing without audio");
                (None, Some(e))
            }
        }
    }
}
