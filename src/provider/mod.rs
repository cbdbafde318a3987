//! Provider adapters for study artifact generation.
//!
//! Two adapters implement [`ContentProvider`]:
//! - [`PrimaryProvider`]: OpenAI chat completions asked for a JSON document per artifact
//! - [`SecondaryProvider`]: a pool of free-text endpoints with retry, parsed by
//!   [`crate::parser`] and backed by [`crate::heuristics`] when parsing yields nothing

mod endpoint;
mod primary;
mod secondary;

pub use endpoint::{EndpointSelector, RandomSelector, SequenceSelector};
pub use primary::{CompletionBackend, CompletionRequest, OpenAiBackend, PrimaryProvider};
pub use secondary::{HttpTextGenerator, SecondaryProvider, TextGenerator, TransportError};

use crate::error::{Result, StudykitError};
use crate::kit::{Generated, KitOptions, Notes, Quiz, ResourceList, StudyGuideDoc};
use async_trait::async_trait;
use std::collections::HashMap;

/// The operations every provider adapter offers.
///
/// Each call either yields an artifact tagged with the tier that produced it, or an
/// error describing why this adapter could not serve the request. Errors never escape
/// as panics; the orchestrator decides what to try next.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short adapter name for logs and errors.
    fn name(&self) -> &'static str;

    /// Markdown summary of `text`.
    async fn summarize(&self, text: &str, options: &KitOptions) -> Result<Generated<String>>;

    /// Learning resources for `topic`.
    async fn find_resources(&self, topic: &str, options: &KitOptions) -> Result<Generated<ResourceList>>;

    async fn build_study_guide(&self, text: &str, options: &KitOptions) -> Result<Generated<StudyGuideDoc>>;

    async fn build_quiz(&self, text: &str, options: &KitOptions) -> Result<Generated<Quiz>>;

    /// Detailed topic notes. Adapters without a notes path report [`StudykitError::Unsupported`].
    async fn build_notes(&self, _text: &str, _options: &KitOptions) -> Result<Generated<Notes>> {
        Err(StudykitError::Unsupported {
            provider: self.name(),
            operation: "build_notes",
        })
    }
}

/// Template variables for one request: the subject (`text` or `topic`) plus every option.
pub(crate) fn template_vars(subject_key: &str, subject: &str, options: &KitOptions) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(subject_key.to_string(), subject.to_string());
    vars.insert("max_bullets".to_string(), options.max_bullets.to_string());
    vars.insert("max_resources".to_string(), options.max_resources.to_string());
    vars.insert("num_questions".to_string(), options.num_questions.to_string());
    vars.insert("max_sections".to_string(), options.max_sections.to_string());
    vars.insert("study_guide_items".to_string(), options.study_guide_items.to_string());
    vars
}

/// First characters of a response for debug logs.
pub(crate) fn preview(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    crate::kit::truncate_chars(&collapsed, 120).into_owned()
}
