//! External service clients for Doppel.
//!
//! Two boundaries live here:
//! - the streaming completion gateway (OpenAI-compatible SSE), and
//! - the dual-provider speech synthesis client.
//!
//! Both decode loosely-typed provider responses into typed structs once,
//! at the boundary, and never pass untyped data onward.

pub mod completion;
pub mod sse;
pub mod speech;

pub use completion::{ByteStream, CompletionBackend, CompletionClient};
pub use sse::SseLineDecoder;
pub use speech::{SpeechProvider, SpeechSynthesizer, Synthesis};
