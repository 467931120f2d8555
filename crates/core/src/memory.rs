//! Memory facts: discrete, importance-tagged personal data injected
//! into the prompt.
//!
//! Facts are immutable once created; users create and delete them but
//! never update them in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How strongly a fact should influence the assistant.
///
/// Ordered so that `High > Medium > Low`; the store sorts descending
/// by importance when reading facts for prompt inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    /// Heading label used when the fact is grouped in a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Importance::High => "HIGH PRIORITY",
            Importance::Medium => "MEDIUM PRIORITY",
            Importance::Low => "LOW PRIORITY",
        }
    }
}

/// A single memory fact belonging to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFact {
    /// Unique fact ID
    pub id: String,

    /// Category label (e.g. "preference", "relationship").
    pub category: String,

    /// The fact text itself.
    pub fact: String,

    /// Prompt-inclusion priority.
    pub importance: Importance,

    /// When this fact was created.
    pub created_at: DateTime<Utc>,
}

impl MemoryFact {
    /// Create a new fact with a generated ID.
    pub fn new(
        category: impl Into<String>,
        fact: impl Into<String>,
        importance: Importance,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: category.into(),
            fact: fact.into(),
            importance,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_orders_high_first() {
        assert!(Importance::High > Importance::Medium);
        assert!(Importance::Medium > Importance::Low);
    }

    #[test]
    fn importance_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Importance::High).unwrap(),
            "\"high\""
        );
        let parsed: Importance = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Importance::Medium);
    }

    #[test]
    fn fact_gets_generated_id() {
        let fact = MemoryFact::new("preference", "Prefers tea over coffee", Importance::Low);
        assert!(!fact.id.is_empty());
        assert_eq!(fact.category, "preference");
    }
}
