//! System-prompt composition, the core architectural component.
//!
//! Turns the four user-scoped context collections into one deterministic
//! instruction string for the language model:
//!
//! 1. **Preamble** (digital-twin role), always present
//! 2. **Persona** (bio, tone, style, phrases), only non-empty fields
//! 3. **Memory facts**, bucketed by importance, high first
//! 4. **Knowledge base**, recency order, content excerpted
//! 5. **Behavioral directives**, fixed block, persona tone interpolated
//! 6. **Active goals**, when any exist
//! 7. **Proactive suggestions**, feature-flagged, independent of content
//!
//! # Determinism
//!
//! Composition is pure and deterministic: identical inputs always
//! produce byte-identical output, which makes golden-file testing
//! practical. Absent optional inputs simply omit their section; this
//! function never fails.

pub mod composer;

pub use composer::{ComposeInput, MAX_DOCUMENT_CHARS, compose};
