//! Conversation-turn orchestration.
//!
//! One turn: persist the user message, assemble the system prompt from
//! the context store, stream the completion into the transcript, persist
//! the finished assistant message, then (optionally) synthesize speech
//! and hand it to the single playback slot. Speech runs strictly after
//! streaming completes; a failed stream persists nothing.

pub mod playback;
pub mod session;
pub mod transcript;

pub use playback::{AudioSink, PlaybackHandle, PlaybackSlot};
pub use session::{ChatSession, TurnOutcome};
pub use transcript::Transcript;
