//! Free-text adapter: a pool of interchangeable inference endpoints.
//!
//! Each call picks an endpoint, retries up to the configured ceiling (backing off on
//! rate limits, rotating endpoints on any other failure), parses whatever text comes
//! back and fills anything the parser could not recover from the heuristics.

use super::endpoint::{EndpointSelector, RandomSelector};
use super::{preview, template_vars, ContentProvider};
use crate::config::{Prompts, SecondaryConfig};
use crate::error::{Result, StudykitError};
use crate::heuristics::{
    synthesize_concepts, synthesize_flashcards, synthesize_key_terms, synthesize_notes, synthesize_quiz,
    synthesize_resources, synthesize_study_guide, synthesize_summary,
};
use crate::heuristics::text::split_sentences;
use crate::kit::{ArtifactKind, Generated, KitOptions, Notes, Quiz, ResourceList, StudyGuideDoc};
use crate::parser::{parse_notes, parse_quiz, parse_resources, parse_study_guide, parse_summary};
use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Why one attempt against one endpoint failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rate limited")]
    RateLimited,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Transport seam of the secondary adapter: one prompt to one endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, endpoint: &str, prompt: &str) -> std::result::Result<String, TransportError>;
}

/// Hugging Face style inference endpoints over HTTP.
pub struct HttpTextGenerator {
    client: reqwest::Client,
    token: Option<String>,
    max_length: u32,
    temperature: f32,
}

impl HttpTextGenerator {
    pub fn new(config: &SecondaryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StudykitError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            max_length: config.max_length,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, endpoint: &str, prompt: &str) -> std::result::Result<String, TransportError> {
        let body = json!({
            "inputs": prompt,
            "parameters": {"max_length": self.max_length, "temperature": self.temperature},
        });

        let mut request = self.client.post(endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        generated_text(&value).ok_or_else(|| TransportError::Malformed(preview(&value.to_string())))
    }
}

/// `[{"generated_text": ...}]`, or `summary_text` from summarization models.
fn generated_text(value: &Value) -> Option<String> {
    let first = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    ["generated_text", "summary_text"]
        .iter()
        .find_map(|key| first.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Secondary adapter. Always returns a structurally valid artifact unless every
/// endpoint was unreachable and the operation is configured to report that.
pub struct SecondaryProvider {
    generator: Arc<dyn TextGenerator>,
    selector: Arc<dyn EndpointSelector>,
    config: SecondaryConfig,
    prompts: Prompts,
}

impl SecondaryProvider {
    /// HTTP transport with uniformly random endpoint selection.
    pub fn new(config: &SecondaryConfig, prompts: Prompts) -> Result<Self> {
        Ok(Self::with_transport(
            Arc::new(HttpTextGenerator::new(config)?),
            Arc::new(RandomSelector),
            config,
            prompts,
        ))
    }

    pub fn with_transport(
        generator: Arc<dyn TextGenerator>,
        selector: Arc<dyn EndpointSelector>,
        config: &SecondaryConfig,
        prompts: Prompts,
    ) -> Self {
        Self {
            generator,
            selector,
            config: config.clone(),
            prompts,
        }
    }

    /// Free text for `prompt`. Once every attempt has failed, the error of the last attempt.
    async fn request_text(&self, prompt: &str) -> Result<String> {
        if !self.config.enabled || self.config.endpoints.is_empty() {
            return Err(StudykitError::Provider("No free-text endpoints configured".to_string()));
        }

        let retry = &self.config.retry;
        let pool_len = self.config.endpoints.len();
        let mut previous = None;
        let mut last_error = StudykitError::Transport("no attempt made".to_string());

        for attempt in 0..retry.max_attempts {
            let idx = self.selector.select(pool_len, previous).min(pool_len - 1);
            let endpoint = &self.config.endpoints[idx];

            match self.generator.generate(endpoint, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(endpoint = %endpoint, response = %preview(&text), "Secondary response");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(endpoint = %endpoint, attempt, "Empty response");
                    last_error = StudykitError::Transport(format!("{}: empty response", endpoint));
                }
                Err(TransportError::RateLimited) => {
                    if attempt + 1 < retry.max_attempts {
                        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
                        let wait = retry.backoff(attempt, jitter);
                        warn!(endpoint = %endpoint, attempt, wait_ms = wait.as_millis() as u64, "Rate limited, backing off");
                        tokio::time::sleep(wait).await;
                    } else {
                        warn!(endpoint = %endpoint, attempt, "Rate limited");
                    }
                    last_error = StudykitError::RateLimited(endpoint.clone());
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, attempt, error = %e, "Request failed, rotating endpoint");
                    last_error = StudykitError::Transport(format!("{}: {}", endpoint, e));
                }
            }
            previous = Some(idx);
        }

        warn!(attempts = retry.max_attempts, error = %last_error, "All free-text endpoints failed");
        Err(last_error)
    }

    async fn request(&self, kind: ArtifactKind, subject_key: &str, subject: &str, options: &KitOptions) -> Result<String> {
        let vars = template_vars(subject_key, subject, options);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.for_kind(kind).free_text, &vars);
        self.request_text(&prompt).await
    }

    fn unreachable(&self, kind: ArtifactKind, cause: StudykitError) -> StudykitError {
        StudykitError::Provider(format!(
            "All free AI endpoints failed to generate a {} ({})",
            kind, cause
        ))
    }
}

#[async_trait]
impl ContentProvider for SecondaryProvider {
    fn name(&self) -> &'static str {
        "secondary"
    }

    #[instrument(skip_all)]
    async fn summarize(&self, text: &str, options: &KitOptions) -> Result<Generated<String>> {
        let parsed = self
            .request(ArtifactKind::Summary, "text", text, options)
            .await
            .ok()
            .and_then(|raw| parse_summary(&raw));

        Ok(match parsed {
            Some(summary) => Generated::secondary(summary),
            None => {
                info!("Using heuristic summary");
                Generated::heuristic(synthesize_summary(text, options.max_bullets))
            }
        })
    }

    #[instrument(skip_all, fields(topic = %topic))]
    async fn find_resources(&self, topic: &str, options: &KitOptions) -> Result<Generated<ResourceList>> {
        let parsed = self
            .request(ArtifactKind::Resources, "topic", topic, options)
            .await
            .ok()
            .map(|raw| parse_resources(&raw, topic, options.max_resources))
            .filter(|resources| !resources.is_empty());

        Ok(match parsed {
            Some(resources) => Generated::secondary(ResourceList::new(resources)),
            None => {
                info!("Using heuristic resources");
                Generated::heuristic(ResourceList::new(synthesize_resources(topic, options.max_resources)))
            }
        })
    }

    #[instrument(skip_all)]
    async fn build_study_guide(&self, text: &str, options: &KitOptions) -> Result<Generated<StudyGuideDoc>> {
        let items = options.study_guide_items;
        let raw = match self.request(ArtifactKind::StudyGuide, "text", text, options).await {
            Ok(raw) => raw,
            Err(e) if !self.config.heuristic_on_unreachable => {
                return Err(self.unreachable(ArtifactKind::StudyGuide, e));
            }
            Err(_) => {
                info!("Using heuristic study guide");
                return Ok(Generated::heuristic(StudyGuideDoc {
                    study_guide: synthesize_study_guide(text, items),
                }));
            }
        };

        let mut guide = parse_study_guide(&raw);
        if guide.is_empty() {
            info!("Study guide response unparseable, using heuristics");
            return Ok(Generated::heuristic(StudyGuideDoc {
                study_guide: synthesize_study_guide(text, items),
            }));
        }

        // Fill only the sections the parser could not recover.
        if guide.key_terms.is_empty() || guide.important_concepts.is_empty() || guide.flashcards.is_empty() {
            let sentences = split_sentences(text);
            if guide.key_terms.is_empty() {
                guide.key_terms = synthesize_key_terms(text, &sentences, items);
            }
            if guide.important_concepts.is_empty() {
                guide.important_concepts = synthesize_concepts(&sentences, items);
            }
            if guide.flashcards.is_empty() {
                warn!("No flashcards parsed, using heuristic flashcards");
                guide.flashcards = synthesize_flashcards(&sentences, &guide.key_terms, items);
            }
        }
        guide.truncate(items);

        Ok(Generated::secondary(StudyGuideDoc { study_guide: guide }))
    }

    #[instrument(skip_all)]
    async fn build_quiz(&self, text: &str, options: &KitOptions) -> Result<Generated<Quiz>> {
        let n = options.num_questions;
        let raw = match self.request(ArtifactKind::Quiz, "text", text, options).await {
            Ok(raw) => raw,
            Err(e) if !self.config.heuristic_on_unreachable => {
                return Err(self.unreachable(ArtifactKind::Quiz, e));
            }
            Err(_) => {
                info!("Using heuristic quiz");
                return Ok(Generated::heuristic(Quiz::new(synthesize_quiz(text, n))));
            }
        };

        let questions = parse_quiz(&raw, n);
        if questions.is_empty() {
            info!("Quiz response unparseable, using heuristics");
            return Ok(Generated::heuristic(Quiz::new(synthesize_quiz(text, n))));
        }
        Ok(Generated::secondary(Quiz::new(questions)))
    }

    #[instrument(skip_all)]
    async fn build_notes(&self, text: &str, options: &KitOptions) -> Result<Generated<Notes>> {
        let parsed = self
            .request(ArtifactKind::Notes, "text", text, options)
            .await
            .ok()
            .map(|raw| parse_notes(&raw, options.max_sections))
            .filter(|notes| !notes.is_empty());

        Ok(match parsed {
            Some(notes) => Generated::secondary(Notes::new(notes)),
            None => {
                info!("Using heuristic notes");
                Generated::heuristic(Notes::new(synthesize_notes(text, options.max_sections)))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, RetryConfig, Settings};
    use crate::heuristics::is_valid_url;
    use crate::kit::Tier;
    use crate::provider::SequenceSelector;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted outcomes and records which endpoints were called.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<std::result::Result<String, TransportError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<std::result::Result<String, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Self::new(Vec::new())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, endpoint: &str, _prompt: &str) -> std::result::Result<String, TransportError> {
            self.calls.lock().unwrap().push(endpoint.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("connection refused".to_string())))
        }
    }

    const TEXT: &str = "Photosynthesis is the process plants use to convert light into energy. \
                        Chlorophyll absorbs light. Glucose is produced.";

    fn config() -> SecondaryConfig {
        let mut config = ProviderConfig::from_settings_with(&Settings::default(), |_| None).secondary;
        config.endpoints = vec!["e0".to_string(), "e1".to_string(), "e2".to_string()];
        config.retry = RetryConfig {
            max_attempts: 3,
            backoff_unit: Duration::ZERO,
        };
        config
    }

    fn provider(generator: Arc<ScriptedGenerator>) -> SecondaryProvider {
        provider_with(generator, config())
    }

    fn provider_with(generator: Arc<ScriptedGenerator>, config: SecondaryConfig) -> SecondaryProvider {
        SecondaryProvider::with_transport(
            generator,
            Arc::new(SequenceSelector::new(vec![0, 1, 2])),
            &config,
            Prompts::default(),
        )
    }

    #[test]
    fn test_generated_text_shapes() {
        assert_eq!(generated_text(&json!([{"generated_text": "hi"}])).as_deref(), Some("hi"));
        assert_eq!(generated_text(&json!([{"summary_text": "sum"}])).as_deref(), Some("sum"));
        assert_eq!(generated_text(&json!({"generated_text": "obj"})).as_deref(), Some("obj"));
        assert_eq!(generated_text(&json!({"error": "loading"})), None);
        assert_eq!(generated_text(&json!([])), None);
    }

    #[tokio::test]
    async fn test_never_more_than_three_attempts() {
        let generator = ScriptedGenerator::new(vec![
            Err(TransportError::RateLimited),
            Err(TransportError::RateLimited),
            Err(TransportError::RateLimited),
            Ok("never reached".to_string()),
        ]);
        let provider = provider(generator.clone());

        let err = provider.request_text("prompt").await.unwrap_err();
        assert!(matches!(err, StudykitError::RateLimited(ref endpoint) if endpoint == "e2"));
        assert_eq!(generator.calls(), vec!["e0", "e1", "e2"]);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_later_endpoint() {
        let generator = ScriptedGenerator::new(vec![
            Err(TransportError::Status(503)),
            Err(TransportError::RateLimited),
            Ok("- Plants make sugar".to_string()),
        ]);
        let provider = provider(generator.clone());

        let summary = provider.summarize(TEXT, &KitOptions::default()).await.unwrap();
        assert_eq!(summary.tier, Tier::Secondary);
        assert_eq!(summary.value, "- Plants make sugar");
        assert_eq!(generator.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_falls_back_to_heuristics() {
        let provider = provider(ScriptedGenerator::unreachable());
        let options = KitOptions::default();

        let summary = provider.summarize(TEXT, &options).await.unwrap();
        assert_eq!(summary.tier, Tier::Heuristic);
        assert!(!summary.value.is_empty());

        let resources = provider.find_resources("Photosynthesis", &options).await.unwrap();
        assert_eq!(resources.value.len(), options.max_resources);
        assert!(resources.value.resources.iter().all(|r| is_valid_url(&r.url)));

        let guide = provider.build_study_guide(TEXT, &options).await.unwrap();
        assert_eq!(guide.tier, Tier::Heuristic);
        assert!(!guide.value.study_guide.key_terms.is_empty());

        let quiz = provider.build_quiz(TEXT, &options).await.unwrap();
        assert!(!quiz.value.is_empty());

        let notes = provider.build_notes(TEXT, &options).await.unwrap();
        assert!(!notes.value.is_empty());
    }

    #[tokio::test]
    async fn test_strict_mode_reports_unreachable() {
        let mut config = config();
        config.heuristic_on_unreachable = false;
        let provider = provider_with(ScriptedGenerator::unreachable(), config);

        let err = provider.build_quiz(TEXT, &KitOptions::default()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provider error: All free AI endpoints failed to generate a quiz \
             (Transport error: e2: network error: connection refused)"
        );
        assert!(provider.build_study_guide(TEXT, &KitOptions::default()).await.is_err());

        // Summaries still degrade to heuristics.
        assert!(provider.summarize(TEXT, &KitOptions::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_flashcards_filled_from_heuristics() {
        let generator = ScriptedGenerator::new(vec![Ok("Key Terms:\n\
             - Photosynthesis: turning light into energy\n\
             Important Concepts:\n\
             - Plants need light\n\
             Flashcards:\n\
             Photosynthesis -> light to energy\n\
             Chlorophyll => pigment\n"
            .to_string())]);
        let provider = provider(generator);

        let guide = provider
            .build_study_guide(TEXT, &KitOptions::default())
            .await
            .unwrap()
            .value
            .study_guide;
        assert_eq!(guide.key_terms[0].term, "Photosynthesis");
        assert_eq!(guide.important_concepts, vec!["Plants need light"]);
        assert!(!guide.flashcards.is_empty());
        assert!(guide.flashcards.iter().all(|card| card.question.ends_with('?')));
    }

    #[tokio::test]
    async fn test_parsed_quiz_is_secondary() {
        let generator = ScriptedGenerator::new(vec![Ok("1. What do plants absorb?\n\
             A) Sound\nB) Light\nC) Heat\nD) Wind\nAnswer: B\n"
            .to_string())]);
        let quiz = provider(generator).build_quiz(TEXT, &KitOptions::default()).await.unwrap();
        assert_eq!(quiz.tier, Tier::Secondary);
        assert_eq!(quiz.value.quiz[0].correct_text(), "Light");
    }

    #[tokio::test]
    async fn test_unparseable_resources_use_heuristics() {
        let generator = ScriptedGenerator::new(vec![Ok("I like plants.".to_string())]);
        let resources = provider(generator)
            .find_resources("Photosynthesis", &KitOptions::default())
            .await
            .unwrap();
        assert_eq!(resources.tier, Tier::Heuristic);
        assert_eq!(resources.value.len(), 3);
    }
}
