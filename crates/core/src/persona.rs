//! Persona settings: the stored stylistic profile that conditions the
//! assistant's voice.
//!
//! At most one row per user. Absence means "use defaults": a friendly
//! tone and proactive suggestions enabled.

use serde::{Deserialize, Serialize};

/// The fallback tone used when the persona has none configured.
pub const DEFAULT_TONE: &str = "friendly";

/// A user's persona configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSettings {
    /// Free-text biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Tone label (e.g. "casual", "professional").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,

    /// Communication style label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<String>,

    /// Ordered list of phrases the twin should weave in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorite_phrases: Vec<String>,

    /// Whether goal-informed proactive suggestions are allowed.
    #[serde(default = "default_proactive")]
    pub proactive_suggestions_enabled: bool,
}

fn default_proactive() -> bool {
    true
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            bio: None,
            tone: None,
            communication_style: None,
            favorite_phrases: Vec::new(),
            proactive_suggestions_enabled: true,
        }
    }
}

impl PersonaSettings {
    /// The tone to interpolate into behavioral directives.
    pub fn effective_tone(&self) -> &str {
        self.tone.as_deref().unwrap_or(DEFAULT_TONE)
    }
}
