//! In-memory backend, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use doppel_core::error::StoreError;
use doppel_core::goal::{GoalStatus, UserGoal};
use doppel_core::knowledge::KnowledgeDocument;
use doppel_core::memory::MemoryFact;
use doppel_core::message::ChatMessage;
use doppel_core::persona::PersonaSettings;
use doppel_core::store::{
    ContextStore, MAX_ACTIVE_GOALS, MAX_HISTORY_MESSAGES, MAX_KNOWLEDGE_DOCUMENTS,
    MAX_MEMORY_FACTS,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Everything the store holds for one user.
#[derive(Default)]
struct UserRecords {
    persona: Option<PersonaSettings>,
    facts: Vec<MemoryFact>,
    documents: Vec<KnowledgeDocument>,
    goals: Vec<UserGoal>,
    history: Vec<ChatMessage>,
}

/// An in-memory store keyed by user ID.
///
/// Read queries apply the same sort orders and row caps the production
/// database queries do, so prompt size stays bounded.
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecords>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_id(id: &mut String) {
    if id.is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn persona(&self, user_id: &str) -> Result<Option<PersonaSettings>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|u| u.persona.clone()))
    }

    async fn memory_facts(&self, user_id: &str) -> Result<Vec<MemoryFact>, StoreError> {
        let users = self.users.read().await;
        let Some(records) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut facts = records.facts.clone();
        // Importance descending; creation order breaks ties (stable sort).
        facts.sort_by(|a, b| b.importance.cmp(&a.importance));
        facts.truncate(MAX_MEMORY_FACTS);
        Ok(facts)
    }

    async fn knowledge_documents(
        &self,
        user_id: &str,
    ) -> Result<Vec<KnowledgeDocument>, StoreError> {
        let users = self.users.read().await;
        let Some(records) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut docs = records.documents.clone();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        docs.truncate(MAX_KNOWLEDGE_DOCUMENTS);
        Ok(docs)
    }

    async fn active_goals(&self, user_id: &str) -> Result<Vec<UserGoal>, StoreError> {
        let users = self.users.read().await;
        let Some(records) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut goals: Vec<UserGoal> = records
            .goals
            .iter()
            .filter(|g| g.is_active())
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.priority);
        goals.truncate(MAX_ACTIVE_GOALS);
        Ok(goals)
    }

    async fn chat_history(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let users = self.users.read().await;
        let Some(records) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        // Most recent window, returned in ascending time order.
        let history = &records.history;
        let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        Ok(history[start..].to_vec())
    }

    async fn append_message(
        &self,
        user_id: &str,
        message: ChatMessage,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .history
            .push(message);
        Ok(())
    }

    async fn clear_history(&self, user_id: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if let Some(records) = users.get_mut(user_id) {
            records.history.clear();
        }
        Ok(())
    }

    async fn set_persona(
        &self,
        user_id: &str,
        persona: PersonaSettings,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().persona = Some(persona);
        Ok(())
    }

    async fn add_memory_fact(
        &self,
        user_id: &str,
        mut fact: MemoryFact,
    ) -> Result<String, StoreError> {
        ensure_id(&mut fact.id);
        let id = fact.id.clone();
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().facts.push(fact);
        Ok(id)
    }

    async fn delete_memory_fact(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(records) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let len_before = records.facts.len();
        records.facts.retain(|f| f.id != id);
        Ok(records.facts.len() < len_before)
    }

    async fn add_document(
        &self,
        user_id: &str,
        mut document: KnowledgeDocument,
    ) -> Result<String, StoreError> {
        ensure_id(&mut document.id);
        let id = document.id.clone();
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .documents
            .push(document);
        Ok(id)
    }

    async fn delete_document(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(records) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let len_before = records.documents.len();
        records.documents.retain(|d| d.id != id);
        Ok(records.documents.len() < len_before)
    }

    async fn add_goal(&self, user_id: &str, mut goal: UserGoal) -> Result<String, StoreError> {
        ensure_id(&mut goal.id);
        let id = goal.id.clone();
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().goals.push(goal);
        Ok(id)
    }

    async fn complete_goal(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(records) = users.get_mut(user_id) else {
            return Ok(false);
        };
        match records.goals.iter_mut().find(|g| g.id == id) {
            Some(goal) => {
                goal.status = GoalStatus::Completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doppel_core::memory::Importance;

    #[tokio::test]
    async fn persona_roundtrip() {
        let store = InMemoryStore::new();
        assert!(store.persona("alice").await.unwrap().is_none());

        let persona = PersonaSettings {
            tone: Some("casual".into()),
            ..Default::default()
        };
        store.set_persona("alice", persona).await.unwrap();

        let loaded = store.persona("alice").await.unwrap().unwrap();
        assert_eq!(loaded.tone.as_deref(), Some("casual"));
        // other users are unaffected
        assert!(store.persona("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn facts_sorted_by_importance_and_capped() {
        let store = InMemoryStore::new();
        store
            .add_memory_fact("alice", MemoryFact::new("work", "low fact", Importance::Low))
            .await
            .unwrap();
        store
            .add_memory_fact("alice", MemoryFact::new("work", "high fact", Importance::High))
            .await
            .unwrap();
        store
            .add_memory_fact(
                "alice",
                MemoryFact::new("work", "medium fact", Importance::Medium),
            )
            .await
            .unwrap();

        let facts = store.memory_facts("alice").await.unwrap();
        assert_eq!(facts[0].importance, Importance::High);
        assert_eq!(facts[1].importance, Importance::Medium);
        assert_eq!(facts[2].importance, Importance::Low);

        for i in 0..30 {
            store
                .add_memory_fact(
                    "alice",
                    MemoryFact::new("bulk", format!("fact {i}"), Importance::Low),
                )
                .await
                .unwrap();
        }
        let facts = store.memory_facts("alice").await.unwrap();
        assert_eq!(facts.len(), MAX_MEMORY_FACTS);
    }

    #[tokio::test]
    async fn documents_most_recent_first() {
        let store = InMemoryStore::new();
        let mut old = KnowledgeDocument::new("Old", "old content");
        old.created_at = chrono::Utc::now() - chrono::Duration::days(2);
        store.add_document("alice", old).await.unwrap();
        store
            .add_document("alice", KnowledgeDocument::new("New", "new content"))
            .await
            .unwrap();

        let docs = store.knowledge_documents("alice").await.unwrap();
        assert_eq!(docs[0].title, "New");
        assert_eq!(docs[1].title, "Old");
    }

    #[tokio::test]
    async fn completed_goals_leave_the_prompt_set() {
        let store = InMemoryStore::new();
        let id = store
            .add_goal("alice", UserGoal::new("Run a marathon", "health", 1))
            .await
            .unwrap();
        store
            .add_goal("alice", UserGoal::new("Learn Rust", "career", 2))
            .await
            .unwrap();

        assert_eq!(store.active_goals("alice").await.unwrap().len(), 2);

        assert!(store.complete_goal("alice", &id).await.unwrap());
        let goals = store.active_goals("alice").await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].title, "Learn Rust");
    }

    #[tokio::test]
    async fn goals_ordered_by_priority() {
        let store = InMemoryStore::new();
        store
            .add_goal("alice", UserGoal::new("Second", "misc", 5))
            .await
            .unwrap();
        store
            .add_goal("alice", UserGoal::new("First", "misc", 1))
            .await
            .unwrap();

        let goals = store.active_goals("alice").await.unwrap();
        assert_eq!(goals[0].title, "First");
    }

    #[tokio::test]
    async fn history_window_keeps_most_recent() {
        let store = InMemoryStore::new();
        for i in 0..60 {
            store
                .append_message("alice", ChatMessage::user(format!("message {i}")))
                .await
                .unwrap();
        }

        let history = store.chat_history("alice").await.unwrap();
        assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
        // ascending time: the window ends at the newest message
        assert_eq!(history.last().unwrap().content, "message 59");
        assert_eq!(history.first().unwrap().content, "message 10");
    }

    #[tokio::test]
    async fn clear_history_removes_everything() {
        let store = InMemoryStore::new();
        store
            .append_message("alice", ChatMessage::user("hello"))
            .await
            .unwrap();
        store.clear_history("alice").await.unwrap();
        assert!(store.chat_history("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_fact_reports_removal() {
        let store = InMemoryStore::new();
        let id = store
            .add_memory_fact("alice", MemoryFact::new("misc", "gone soon", Importance::Low))
            .await
            .unwrap();
        assert!(store.delete_memory_fact("alice", &id).await.unwrap());
        assert!(!store.delete_memory_fact("alice", &id).await.unwrap());
    }
}
