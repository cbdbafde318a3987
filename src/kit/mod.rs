//! Study kit data model.
//!
//! Everything here is plain data scoped to a single pipeline run; nothing is persisted.

mod artifacts;

pub use artifacts::{
    Flashcard, KeyTerm, NoteSection, Notes, OptionLabel, Quiz, QuizOptions, QuizQuestion, ResourceItem,
    ResourceList, StudyGuide, StudyGuideDoc,
};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Where the transcript text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Text,
    Youtube,
    Audio,
    File,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(SourceKind::Text),
            "youtube" => Ok(SourceKind::Youtube),
            "audio" => Ok(SourceKind::Audio),
            "file" => Ok(SourceKind::File),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Text => write!(f, "text"),
            SourceKind::Youtube => write!(f, "youtube"),
            SourceKind::Audio => write!(f, "audio"),
            SourceKind::File => write!(f, "file"),
        }
    }
}

/// Raw study content handed to the pipeline by an input adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default)]
    pub source: SourceKind,
}

impl Transcript {
    pub fn new(text: impl Into<String>, source: SourceKind) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, SourceKind::Text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The text capped at `max_chars` characters, with `...` appended when cut.
    pub fn truncated(&self, max_chars: usize) -> Cow<'_, str> {
        truncate_chars(&self.text, max_chars)
    }
}

/// Cap `text` at `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

/// Per-run generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitOptions {
    /// Maximum number of summary bullets.
    pub max_bullets: usize,
    /// Maximum number of suggested resources.
    pub max_resources: usize,
    /// Number of quiz questions.
    pub num_questions: usize,
    /// Number of note sections.
    pub max_sections: usize,
    /// Cap for each study guide section.
    pub study_guide_items: usize,
}

impl Default for KitOptions {
    fn default() -> Self {
        Self {
            max_bullets: 7,
            max_resources: 3,
            num_questions: 5,
            max_sections: 3,
            study_guide_items: 5,
        }
    }
}

/// One structured output of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Summary,
    Resources,
    StudyGuide,
    Quiz,
    Notes,
}

impl ArtifactKind {
    /// Essential stages abort the pipeline when every tier fails.
    pub fn is_essential(self) -> bool {
        !matches!(self, ArtifactKind::Notes)
    }

    /// Top-level key of the structured payload for this kind.
    pub fn payload_key(self) -> &'static str {
        match self {
            ArtifactKind::Summary => "summary",
            ArtifactKind::Resources => "resources",
            ArtifactKind::StudyGuide => "study_guide",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Notes => "notes",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Summary => write!(f, "summary"),
            ArtifactKind::Resources => write!(f, "resources"),
            ArtifactKind::StudyGuide => write!(f, "study guide"),
            ArtifactKind::Quiz => write!(f, "quiz"),
            ArtifactKind::Notes => write!(f, "notes"),
        }
    }
}

/// Fallback tier that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Secondary,
    Heuristic,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Primary => write!(f, "primary"),
            Tier::Secondary => write!(f, "secondary"),
            Tier::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// An artifact together with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub tier: Tier,
}

impl<T> Generated<T> {
    pub fn new(value: T, tier: Tier) -> Self {
        Self { value, tier }
    }

    pub fn primary(value: T) -> Self {
        Self::new(value, Tier::Primary)
    }

    pub fn secondary(value: T) -> Self {
        Self::new(value, Tier::Secondary)
    }

    pub fn heuristic(value: T) -> Self {
        Self::new(value, Tier::Heuristic)
    }
}

/// Aggregate result of one `generate_kit` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub resources: Option<ResourceList>,
    pub study_guide: Option<StudyGuideDoc>,
    pub quiz: Option<Quiz>,
    pub detailed_notes: Option<Notes>,
    pub error: Option<String>,
    /// Tier that served each artifact. Observability only.
    #[serde(skip)]
    pub served_by: BTreeMap<ArtifactKind, Tier>,
}

impl PipelineResult {
    /// A failed run: only the error (and transcript, when one was accepted) is kept.
    pub fn failure(transcript: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            transcript,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// True when all four essential artifacts are present.
    pub fn has_essentials(&self) -> bool {
        self.summary.is_some() && self.resources.is_some() && self.study_guide.is_some() && self.quiz.is_some()
    }
}
