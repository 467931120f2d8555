//! # Doppel Core
//!
//! Domain types, traits, and error definitions for the Doppel
//! digital-twin runtime. This crate has **zero framework dependencies**:
//! it defines the domain model that all other crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod goal;
pub mod knowledge;
pub mod memory;
pub mod message;
pub mod persona;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GatewayError, Result, SpeechError, StoreError};
pub use goal::{GoalStatus, UserGoal};
pub use knowledge::KnowledgeDocument;
pub use memory::{Importance, MemoryFact};
pub use message::{ChatMessage, Role};
pub use persona::{DEFAULT_TONE, PersonaSettings};
pub use store::{
    ContextStore, MAX_ACTIVE_GOALS, MAX_HISTORY_MESSAGES, MAX_KNOWLEDGE_DOCUMENTS,
    MAX_MEMORY_FACTS,
};
