//! The in-flight conversation view.
//!
//! The transcript mirrors what a reader of the conversation sees while
//! a completion streams in: the assistant's reply is a single message
//! whose content grows with each delta, never a trail of one-fragment
//! bubbles.

use doppel_core::message::{ChatMessage, Role};

/// Ordered conversation messages with in-place streaming updates.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the transcript from persisted history.
    pub fn from_history(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a new user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Apply one streaming delta.
    ///
    /// Extends the trailing assistant message in place, or starts one if
    /// the last message is not assistant-role. Both the check and the
    /// mutation happen inside this one `&mut` call, so a fragment can
    /// never land as a duplicate bubble.
    pub fn apply_delta(&mut self, fragment: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => last.content.push_str(fragment),
            _ => self.messages.push(ChatMessage::assistant(fragment)),
        }
    }

    /// Content of the trailing assistant message, if the transcript
    /// currently ends with one.
    pub fn last_assistant_content(&self) -> Option<&str> {
        match self.messages.last() {
            Some(last) if last.role == Role::Assistant => Some(&last.content),
            _ => None,
        }
    }

    /// Remove the trailing assistant message.
    ///
    /// Used when a stream fails partway: the half-written reply must not
    /// be presented (or persisted) as final. No-op when the transcript
    /// does not end with an assistant message.
    pub fn discard_partial_assistant(&mut self) -> Option<ChatMessage> {
        match self.messages.last() {
            Some(last) if last.role == Role::Assistant => self.messages.pop(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_grow_one_assistant_message() {
        let mut transcript = Transcript::new();
        transcript.push_user("Hi");
        transcript.apply_delta("Hel");
        transcript.apply_delta("lo");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last_assistant_content(), Some("Hello"));
    }

    #[test]
    fn delta_after_user_message_starts_fresh_reply() {
        let mut transcript = Transcript::new();
        transcript.apply_delta("First answer");
        transcript.push_user("Another question");
        transcript.apply_delta("Second");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[0].content, "First answer");
        assert_eq!(transcript.last_assistant_content(), Some("Second"));
    }

    #[test]
    fn discard_removes_only_a_trailing_assistant() {
        let mut transcript = Transcript::new();
        transcript.push_user("Hi");
        assert!(transcript.discard_partial_assistant().is_none());
        assert_eq!(transcript.len(), 1);

        transcript.apply_delta("partial");
        let removed = transcript.discard_partial_assistant().unwrap();
        assert_eq!(removed.content, "partial");
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn from_history_preserves_order() {
        let history = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        let transcript = Transcript::from_history(history);
        assert_eq!(transcript.messages()[0].content, "a");
        assert_eq!(transcript.last_assistant_content(), Some("b"));
    }
}
