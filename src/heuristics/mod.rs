//! Heuristic extraction: deterministic, offline study artifacts.
//!
//! These functions are the last line of the fallback chain. They never touch the
//! network and never fail; the worst case is a placeholder entry that still satisfies
//! the artifact schema.

mod links;
mod synthesis;
pub mod text;
mod topic;

pub use links::{is_valid_url, reliable_url, synthesize_resources};
pub use synthesis::{
    synthesize_concepts, synthesize_flashcards, synthesize_key_terms, synthesize_notes, synthesize_quiz,
    synthesize_quiz_with_rng, synthesize_study_guide, synthesize_summary,
};
pub use topic::extract_topic;
