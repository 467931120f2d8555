//! Knowledge documents: user-provided reference material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A knowledge document belonging to a user.
///
/// Content is arbitrary-length text; prompt composition truncates it to
/// a fixed excerpt, the full content is only ever read back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Unique document ID
    pub id: String,

    /// Document title.
    pub title: String,

    /// Full document text.
    pub content: String,

    /// Optional type label (e.g. "note", "article").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// When this document was added.
    pub created_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    /// Create a new document with a generated ID.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            document_type: None,
            created_at: Utc::now(),
        }
    }

    /// Builder-style type label.
    pub fn with_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builder() {
        let doc = KnowledgeDocument::new("Resume", "Ten years of Rust").with_type("document");
        assert_eq!(doc.title, "Resume");
        assert_eq!(doc.document_type.as_deref(), Some("document"));
    }
}
