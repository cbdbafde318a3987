//! Pipeline orchestrator for Studykit.
//!
//! Generates the study kit stage by stage. Every stage walks the same tier sequence
//! (primary adapter, then secondary adapter) and stops at the first success.

use crate::config::{ProviderConfig, Prompts, Settings};
use crate::error::{Result, StudykitError};
use crate::heuristics::extract_topic;
use crate::kit::{ArtifactKind, Generated, KitOptions, PipelineResult, Transcript};
use crate::provider::{ContentProvider, PrimaryProvider, SecondaryProvider};
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

type StageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Generated<T>>> + Send + 'a>>;

/// The main orchestrator for the Studykit pipeline.
pub struct Orchestrator {
    /// Adapters in the order they are tried.
    tiers: Vec<Arc<dyn ContentProvider>>,
    max_transcript_chars: usize,
}

impl Orchestrator {
    /// Create an orchestrator with the OpenAI primary and the free-text secondary adapter.
    pub fn new(config: &ProviderConfig, prompts: Prompts) -> Result<Self> {
        if config.primary_available() {
            info!("Primary provider: {}", config.primary.model);
        } else {
            info!("Primary provider unavailable, starting with the free-text endpoints");
        }

        let primary = Arc::new(PrimaryProvider::new(&config.primary, prompts.clone())?);
        let secondary = Arc::new(SecondaryProvider::new(&config.secondary, prompts)?);
        Ok(Self::with_providers(primary, secondary, config.max_transcript_chars))
    }

    /// Load prompts and credentials from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Self::new(&ProviderConfig::from_settings(settings), prompts)
    }

    /// Create an orchestrator with custom adapters.
    pub fn with_providers(
        primary: Arc<dyn ContentProvider>,
        secondary: Arc<dyn ContentProvider>,
        max_transcript_chars: usize,
    ) -> Self {
        Self {
            tiers: vec![primary, secondary],
            max_transcript_chars,
        }
    }

    /// Generate the full study kit for one transcript.
    ///
    /// Summary, resources, study guide and quiz are essential: if every tier fails for
    /// one of them the run stops and only the error is returned. Notes are best-effort.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4(), source = %transcript.source))]
    pub async fn generate_kit(&self, transcript: &Transcript, options: &KitOptions) -> PipelineResult {
        if transcript.is_empty() {
            let error = StudykitError::InvalidInput("No valid transcript".to_string());
            warn!(error = %error, "Rejecting empty transcript");
            return PipelineResult::failure(None, error.to_string());
        }

        let text = transcript.truncated(self.max_transcript_chars);
        if matches!(text, Cow::Owned(_)) {
            info!(max_chars = self.max_transcript_chars, "Transcript truncated");
        }
        let text: &str = &text;
        let topic = extract_topic(text);
        info!(topic = %topic, "Extracted topic");

        let mut result = PipelineResult {
            transcript: Some(transcript.text.clone()),
            ..Default::default()
        };

        let summary = match self.run_stage(ArtifactKind::Summary, |p| p.summarize(text, options)).await {
            Ok(generated) => generated,
            Err(e) => return abort(transcript, ArtifactKind::Summary, e),
        };
        result.served_by.insert(ArtifactKind::Summary, summary.tier);
        result.summary = Some(summary.value);

        let resources = match self
            .run_stage(ArtifactKind::Resources, |p| p.find_resources(&topic, options))
            .await
        {
            Ok(generated) => generated,
            Err(e) => return abort(transcript, ArtifactKind::Resources, e),
        };
        result.served_by.insert(ArtifactKind::Resources, resources.tier);
        result.resources = Some(resources.value);

        let study_guide = match self
            .run_stage(ArtifactKind::StudyGuide, |p| p.build_study_guide(text, options))
            .await
        {
            Ok(generated) => generated,
            Err(e) => return abort(transcript, ArtifactKind::StudyGuide, e),
        };
        result.served_by.insert(ArtifactKind::StudyGuide, study_guide.tier);
        result.study_guide = Some(study_guide.value);

        let quiz = match self.run_stage(ArtifactKind::Quiz, |p| p.build_quiz(text, options)).await {
            Ok(generated) => generated,
            Err(e) => return abort(transcript, ArtifactKind::Quiz, e),
        };
        result.served_by.insert(ArtifactKind::Quiz, quiz.tier);
        result.quiz = Some(quiz.value);

        match self.run_stage(ArtifactKind::Notes, |p| p.build_notes(text, options)).await {
            Ok(notes) => {
                result.served_by.insert(ArtifactKind::Notes, notes.tier);
                result.detailed_notes = Some(notes.value);
            }
            Err(e) => warn!(error = %e, "Detailed notes unavailable"),
        }

        result.success = true;
        info!(served_by = ?result.served_by, "Study kit generated");
        result
    }

    /// Try each tier in order; the last tier's error is returned when all fail.
    async fn run_stage<'a, T>(
        &'a self,
        kind: ArtifactKind,
        call: impl Fn(&'a dyn ContentProvider) -> StageFuture<'a, T>,
    ) -> Result<Generated<T>> {
        let mut last_error = None;

        for provider in &self.tiers {
            match call(provider.as_ref()).await {
                Ok(generated) => {
                    info!(artifact = %kind, provider = provider.name(), tier = %generated.tier, "Stage served");
                    return Ok(generated);
                }
                Err(e) => {
                    warn!(artifact = %kind, provider = provider.name(), error = %e, "Provider failed, falling back");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| StudykitError::Provider(format!("No provider configured for {}", kind))))
    }
}

fn abort(transcript: &Transcript, kind: ArtifactKind, error: StudykitError) -> PipelineResult {
    warn!(artifact = %kind, error = %error, "Essential stage failed, aborting run");
    PipelineResult::failure(Some(transcript.text.clone()), error.to_string())
}
