//! The prompt composer. Stateless, no I/O, infallible.

use doppel_core::goal::UserGoal;
use doppel_core::knowledge::KnowledgeDocument;
use doppel_core::memory::{Importance, MemoryFact};
use doppel_core::persona::{DEFAULT_TONE, PersonaSettings};

/// Maximum characters of document content injected per document.
/// Longer content is cut at this boundary with an ellipsis marker.
pub const MAX_DOCUMENT_CHARS: usize = 1000;

const PREAMBLE: &str = "You are a digital doppelganger assistant that mimics the user's \
communication style and uses their personal knowledge base.";

const CLOSING: &str = "Instructions: Respond in the user's style using the persona settings \
above. Reference memory facts and knowledge base content when relevant. Be natural and \
conversational.";

/// All inputs required to compose one system prompt.
///
/// The caller guarantees the collections already carry the repository
/// read orders: facts importance-descending, documents most recent
/// first, goals in priority order. Row caps are enforced at the store.
pub struct ComposeInput<'a> {
    /// The user's persona, if configured.
    pub persona: Option<&'a PersonaSettings>,
    /// Memory facts, importance descending.
    pub memories: &'a [MemoryFact],
    /// Knowledge documents, most recent first.
    pub documents: &'a [KnowledgeDocument],
    /// Active goals in priority order.
    pub goals: &'a [UserGoal],
    /// Whether the proactive-suggestion directive is appended.
    pub proactive_enabled: bool,
}

/// Compose the system prompt.
///
/// Deterministic: identical inputs yield byte-identical output.
pub fn compose(input: &ComposeInput<'_>) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(PREAMBLE);
    out.push_str("\n\n");

    if let Some(persona) = input.persona {
        render_persona(&mut out, persona);
    }

    render_memories(&mut out, input.memories);
    render_documents(&mut out, input.documents);
    render_directives(&mut out, input.persona);
    render_goals(&mut out, input.goals);

    if input.proactive_enabled {
        render_proactive(&mut out);
    }

    out.push_str(CLOSING);
    out
}

// --- Section renderers ---

fn render_persona(out: &mut String, persona: &PersonaSettings) {
    out.push_str("PERSONA SETTINGS:\n");
    if let Some(bio) = persona.bio.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Bio: {bio}\n"));
    }
    if let Some(tone) = persona.tone.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Tone: {tone}\n"));
    }
    if let Some(style) = persona
        .communication_style
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        out.push_str(&format!("Communication Style: {style}\n"));
    }
    if !persona.favorite_phrases.is_empty() {
        out.push_str(&format!(
            "Favorite Phrases: {}\n",
            persona.favorite_phrases.join(", ")
        ));
    }
    out.push('\n');
}

fn render_memories(out: &mut String, memories: &[MemoryFact]) {
    if memories.is_empty() {
        return;
    }

    out.push_str("MEMORY FACTS (use these to personalize responses):\n");
    // Three buckets, high first, input order preserved within a bucket.
    for importance in [Importance::High, Importance::Medium, Importance::Low] {
        let bucket: Vec<&MemoryFact> = memories
            .iter()
            .filter(|m| m.importance == importance)
            .collect();
        if bucket.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", importance.label()));
        for fact in bucket {
            out.push_str(&format!("- [{}] {}\n", fact.category, fact.fact));
        }
    }
    out.push('\n');
}

fn render_documents(out: &mut String, documents: &[KnowledgeDocument]) {
    if documents.is_empty() {
        return;
    }

    out.push_str("KNOWLEDGE BASE (reference this information when relevant):\n");
    for doc in documents {
        match doc.document_type.as_deref().filter(|s| !s.is_empty()) {
            Some(kind) => out.push_str(&format!("\n### {} ({})\n", doc.title, kind)),
            None => out.push_str(&format!("\n### {}\n", doc.title)),
        }
        out.push_str(&excerpt(&doc.content));
        out.push('\n');
    }
    out.push('\n');
}

fn render_directives(out: &mut String, persona: Option<&PersonaSettings>) {
    let tone = persona.map(|p| p.effective_tone()).unwrap_or(DEFAULT_TONE);

    out.push_str("BEHAVIORAL DIRECTIVES:\n");
    out.push_str(&format!(
        "- Keep a {tone} tone throughout, adapting intensity to the user's mood.\n"
    ));
    out.push_str(
        "- Mirror the user's vocabulary, sentence rhythm, and favorite phrases so replies \
sound like them.\n",
    );
    out.push_str(
        "- Show emotional intelligence: acknowledge how the user seems to feel before \
offering solutions.\n",
    );
    out.push('\n');
}

fn render_goals(out: &mut String, goals: &[UserGoal]) {
    if goals.is_empty() {
        return;
    }

    out.push_str("ACTIVE GOALS (keep these in mind):\n");
    for goal in goals {
        let description = if goal.description.is_empty() {
            "No description provided"
        } else {
            &goal.description
        };
        out.push_str(&format!(
            "- {} [{}, priority {}]: {}",
            goal.title, goal.category, goal.priority, description
        ));
        if let Some(date) = goal.target_date {
            out.push_str(&format!(" (Target: {})", date.format("%Y-%m-%d")));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn render_proactive(out: &mut String) {
    out.push_str("PROACTIVE SUGGESTIONS:\n");
    out.push_str(
        "When a natural opening arises, offer one unsolicited suggestion that moves an \
active goal forward. Tie it to a concrete goal, keep it brief, and never force it.\n",
    );
    out.push('\n');
}

/// First [`MAX_DOCUMENT_CHARS`] characters with a trailing marker when
/// cut. Character-based so a multi-byte scalar is never split.
fn excerpt(content: &str) -> String {
    match content.char_indices().nth(MAX_DOCUMENT_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}
