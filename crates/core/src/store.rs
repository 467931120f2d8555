//! ContextStore trait, the user-scoped persistence boundary.
//!
//! The store is consumed read-mostly by the chat turn: four context
//! queries with fixed sort orders and row caps, a history window, and
//! append. The write side covers the surrounding application's CRUD
//! glue (create/delete facts, documents, goals, persona upserts).
//!
//! Implementations: in-memory (tests, ephemeral sessions); anything
//! backed by a real database lives behind this same trait.

use crate::error::StoreError;
use crate::goal::UserGoal;
use crate::knowledge::KnowledgeDocument;
use crate::memory::MemoryFact;
use crate::message::ChatMessage;
use crate::persona::PersonaSettings;
use async_trait::async_trait;

/// Maximum memory facts a single prompt may draw on.
pub const MAX_MEMORY_FACTS: usize = 20;
/// Maximum knowledge documents a single prompt may draw on.
pub const MAX_KNOWLEDGE_DOCUMENTS: usize = 10;
/// Maximum active goals a single prompt may draw on.
pub const MAX_ACTIVE_GOALS: usize = 10;
/// History priming window for one turn.
pub const MAX_HISTORY_MESSAGES: usize = 50;

/// The user-scoped context store.
///
/// The read caps above are enforced by implementations, not callers, so
/// prompt size stays bounded no matter how much data a user accumulates.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// The backend name (e.g. "in_memory").
    fn name(&self) -> &str;

    // --- Context reads (prompt inputs) ---

    /// The user's persona, if configured.
    async fn persona(&self, user_id: &str) -> Result<Option<PersonaSettings>, StoreError>;

    /// Memory facts, importance descending, capped at [`MAX_MEMORY_FACTS`].
    async fn memory_facts(&self, user_id: &str) -> Result<Vec<MemoryFact>, StoreError>;

    /// Knowledge documents, most recent first, capped at
    /// [`MAX_KNOWLEDGE_DOCUMENTS`].
    async fn knowledge_documents(
        &self,
        user_id: &str,
    ) -> Result<Vec<KnowledgeDocument>, StoreError>;

    /// Active goals in priority order, capped at [`MAX_ACTIVE_GOALS`].
    async fn active_goals(&self, user_id: &str) -> Result<Vec<UserGoal>, StoreError>;

    // --- Chat history ---

    /// The most recent [`MAX_HISTORY_MESSAGES`] messages, ascending time.
    async fn chat_history(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    /// Append one message to the user's history.
    async fn append_message(&self, user_id: &str, message: ChatMessage)
    -> Result<(), StoreError>;

    /// Delete the user's entire history.
    async fn clear_history(&self, user_id: &str) -> Result<(), StoreError>;

    // --- CRUD glue for the surrounding application ---

    /// Upsert the user's persona (at most one row per user).
    async fn set_persona(&self, user_id: &str, persona: PersonaSettings)
    -> Result<(), StoreError>;

    /// Store a new memory fact, returning its ID.
    async fn add_memory_fact(&self, user_id: &str, fact: MemoryFact)
    -> Result<String, StoreError>;

    /// Delete a memory fact by ID. Returns whether anything was removed.
    async fn delete_memory_fact(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;

    /// Store a new knowledge document, returning its ID.
    async fn add_document(
        &self,
        user_id: &str,
        document: KnowledgeDocument,
    ) -> Result<String, StoreError>;

    /// Delete a knowledge document by ID. Returns whether anything was removed.
    async fn delete_document(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;

    /// Store a new goal, returning its ID.
    async fn add_goal(&self, user_id: &str, goal: UserGoal) -> Result<String, StoreError>;

    /// Mark a goal completed, removing it from prompt eligibility.
    async fn complete_goal(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;
}
