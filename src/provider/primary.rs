//! Schema-constrained adapter: OpenAI chat completions in JSON mode.

use super::{preview, template_vars, ContentProvider};
use crate::config::{PrimaryConfig, Prompts};
use crate::error::{Result, StudykitError};
use crate::kit::{ArtifactKind, Generated, KitOptions, Notes, Quiz, ResourceList, StudyGuideDoc};
use crate::openai::create_client_with_timeout;
use crate::parser::{normalize_notes, normalize_quiz, normalize_resources, normalize_study_guide};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Ask for a JSON object instead of free text.
    pub json: bool,
    pub max_tokens: u32,
}

/// Transport seam of the primary adapter.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Raw message content of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Chat completions against the OpenAI API.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, config: &PrimaryConfig) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(api_key, config.timeout)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()
            .map_err(|e| StudykitError::OpenAI(e.to_string()))?
            .into()];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(request.max_tokens);
        if request.json {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = builder.build().map_err(|e| StudykitError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| StudykitError::OpenAI(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| StudykitError::OpenAI("Empty response".to_string()))
    }
}

/// Primary adapter. Requests one JSON document per artifact and never attempts free-text recovery.
pub struct PrimaryProvider {
    /// `None` when no API key was configured; every call then fails fast.
    backend: Option<Arc<dyn CompletionBackend>>,
    config: PrimaryConfig,
    prompts: Prompts,
}

impl PrimaryProvider {
    /// Build the adapter from resolved configuration. A missing key is not an error here.
    pub fn new(config: &PrimaryConfig, prompts: Prompts) -> Result<Self> {
        let backend = match (&config.api_key, config.enabled) {
            (Some(key), true) => Some(Arc::new(OpenAiBackend::new(key, config)?) as Arc<dyn CompletionBackend>),
            _ => None,
        };
        Ok(Self {
            backend,
            config: config.clone(),
            prompts,
        })
    }

    /// Build the adapter around an explicit backend.
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, config: &PrimaryConfig, prompts: Prompts) -> Self {
        Self {
            backend: Some(backend),
            config: config.clone(),
            prompts,
        }
    }

    fn backend(&self) -> Result<&dyn CompletionBackend> {
        if !self.config.enabled {
            return Err(StudykitError::Provider("Primary provider is disabled".to_string()));
        }
        self.backend
            .as_deref()
            .ok_or_else(|| StudykitError::Provider(format!("{} is not set", self.config.api_key_env)))
    }

    fn prompt(&self, kind: ArtifactKind, vars: &HashMap<String, String>) -> String {
        self.prompts.render_with_custom(&self.prompts.for_kind(kind).structured, vars)
    }

    /// Request a JSON document for `kind` and return the value under its payload key.
    async fn request_payload(&self, kind: ArtifactKind, prompt: String, max_tokens: u32) -> Result<Value> {
        let content = self
            .backend()?
            .complete(CompletionRequest {
                prompt,
                json: true,
                max_tokens,
            })
            .await?;
        debug!(artifact = %kind, response = %preview(&content), "Primary response");

        let parsed: Value = serde_json::from_str(content.trim()).map_err(|e| StudykitError::Parse(e.to_string()))?;
        let mut wrapped = wrap_payload(kind, parsed);
        Ok(wrapped[kind.payload_key()].take())
    }
}

/// Put `value` under the payload key of `kind` unless it already sits there.
pub(crate) fn wrap_payload(kind: ArtifactKind, value: Value) -> Value {
    let key = kind.payload_key();
    match value {
        Value::Object(ref map) if map.contains_key(key) => value,
        other => json!({ key: other }),
    }
}

#[async_trait]
impl ContentProvider for PrimaryProvider {
    fn name(&self) -> &'static str {
        "primary"
    }

    #[instrument(skip_all)]
    async fn summarize(&self, text: &str, options: &KitOptions) -> Result<Generated<String>> {
        let prompt = self.prompt(ArtifactKind::Summary, &template_vars("text", text, options));
        let summary = self
            .backend()?
            .complete(CompletionRequest {
                prompt,
                json: false,
                max_tokens: self.config.short_max_tokens,
            })
            .await?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(StudykitError::Provider("Empty summary".to_string()));
        }
        Ok(Generated::primary(summary.to_string()))
    }

    #[instrument(skip_all, fields(topic = %topic))]
    async fn find_resources(&self, topic: &str, options: &KitOptions) -> Result<Generated<ResourceList>> {
        let prompt = self.prompt(ArtifactKind::Resources, &template_vars("topic", topic, options));
        let payload = self
            .request_payload(ArtifactKind::Resources, prompt, self.config.short_max_tokens)
            .await?;

        let resources = normalize_resources(&payload, topic, options.max_resources);
        if resources.is_empty() {
            return Err(StudykitError::Provider("No resources in response".to_string()));
        }
        Ok(Generated::primary(ResourceList::new(resources)))
    }

    #[instrument(skip_all)]
    async fn build_study_guide(&self, text: &str, options: &KitOptions) -> Result<Generated<StudyGuideDoc>> {
        let prompt = self.prompt(ArtifactKind::StudyGuide, &template_vars("text", text, options));
        let payload = self
            .request_payload(ArtifactKind::StudyGuide, prompt, self.config.long_max_tokens)
            .await?;

        let mut study_guide = normalize_study_guide(&payload);
        study_guide.truncate(options.study_guide_items);
        if study_guide.is_empty() {
            return Err(StudykitError::Provider("Empty study guide in response".to_string()));
        }
        Ok(Generated::primary(StudyGuideDoc { study_guide }))
    }

    #[instrument(skip_all)]
    async fn build_quiz(&self, text: &str, options: &KitOptions) -> Result<Generated<Quiz>> {
        let prompt = self.prompt(ArtifactKind::Quiz, &template_vars("text", text, options));
        let payload = self
            .request_payload(ArtifactKind::Quiz, prompt, self.config.long_max_tokens)
            .await?;

        let quiz = normalize_quiz(&payload, options.num_questions);
        if quiz.is_empty() {
            return Err(StudykitError::Provider("No quiz questions in response".to_string()));
        }
        Ok(Generated::primary(Quiz::new(quiz)))
    }

    #[instrument(skip_all)]
    async fn build_notes(&self, text: &str, options: &KitOptions) -> Result<Generated<Notes>> {
        if !self.config.notes {
            return Err(StudykitError::Unsupported {
                provider: self.name(),
                operation: "build_notes",
            });
        }

        let prompt = self.prompt(ArtifactKind::Notes, &template_vars("text", text, options));
        let payload = self
            .request_payload(ArtifactKind::Notes, prompt, self.config.long_max_tokens)
            .await?;

        let notes = normalize_notes(&payload, options.max_sections);
        if notes.is_empty() {
            return Err(StudykitError::Provider("No note sections in response".to_string()));
        }
        Ok(Generated::primary(Notes::new(notes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, Settings};
    use crate::kit::{OptionLabel, Tier};
    use std::sync::Mutex;

    /// Replies with canned content and records every request.
    struct CannedBackend {
        reply: Result<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedBackend {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(StudykitError::OpenAI("quota exceeded".to_string())),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(StudykitError::OpenAI(e.to_string())),
            }
        }
    }

    fn config() -> PrimaryConfig {
        ProviderConfig::from_settings_with(&Settings::default(), |_| Some("sk-test".to_string())).primary
    }

    fn provider(backend: Arc<CannedBackend>) -> PrimaryProvider {
        PrimaryProvider::with_backend(backend, &config(), Prompts::default())
    }

    #[test]
    fn test_wrap_payload() {
        let bare = json!([{"question": "Q?"}]);
        assert_eq!(wrap_payload(ArtifactKind::Quiz, bare.clone()), json!({"quiz": bare}));

        let wrapped = json!({"quiz": []});
        assert_eq!(wrap_payload(ArtifactKind::Quiz, wrapped.clone()), wrapped);

        let other = json!({"key_terms": []});
        assert_eq!(
            wrap_payload(ArtifactKind::StudyGuide, other.clone()),
            json!({"study_guide": other})
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let config = ProviderConfig::from_settings_with(&Settings::default(), |_| None).primary;
        let provider = PrimaryProvider::new(&config, Prompts::default()).unwrap();

        let err = provider.summarize("text", &KitOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_unwrapped_study_guide_is_accepted() {
        let backend = CannedBackend::replying(
            r#"{"key_terms": [{"term": "Chlorophyll", "definition": "Green pigment"}],
                "important_concepts": ["Light becomes chemical energy"],
                "flashcards": [{"question": "What absorbs light?", "answer": "Chlorophyll"}]}"#,
        );
        let provider = provider(backend.clone());

        let generated = provider
            .build_study_guide("Photosynthesis text", &KitOptions::default())
            .await
            .unwrap();
        assert_eq!(generated.tier, Tier::Primary);
        assert_eq!(generated.value.study_guide.key_terms[0].term, "Chlorophyll");

        let requests = backend.requests.lock().unwrap();
        assert!(requests[0].json);
        assert_eq!(requests[0].max_tokens, 2000);
        assert!(requests[0].prompt.contains("Photosynthesis text"));
    }

    #[tokio::test]
    async fn test_quiz_array_payload() {
        let backend = CannedBackend::replying(
            r#"[{"question": "Largest planet?", "options": ["Mars", "Jupiter", "Venus", "Earth"], "correct_answer": "Jupiter"}]"#,
        );
        let quiz = provider(backend).build_quiz("text", &KitOptions::default()).await.unwrap();
        assert_eq!(quiz.value.quiz[0].correct_answer, OptionLabel::B);
    }

    #[tokio::test]
    async fn test_malformed_json_is_failure() {
        let backend = CannedBackend::replying("Sure! Here are some resources: ...");
        let err = provider(backend)
            .find_resources("Cells", &KitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StudykitError::Parse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_reported() {
        let err = provider(CannedBackend::failing())
            .build_quiz("text", &KitOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_empty_payloads_are_failures() {
        let backend = CannedBackend::replying(r#"{"resources": []}"#);
        assert!(provider(backend)
            .find_resources("Cells", &KitOptions::default())
            .await
            .is_err());

        let backend = CannedBackend::replying(r#"{"study_guide": {}}"#);
        assert!(provider(backend)
            .build_study_guide("text", &KitOptions::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_notes_unsupported_unless_enabled() {
        let backend = CannedBackend::replying(r#"{"notes": [{"topic": "Cells"}]}"#);
        let err = provider(backend.clone())
            .build_notes("text", &KitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StudykitError::Unsupported { .. }));
        assert!(backend.requests.lock().unwrap().is_empty());

        let mut config = config();
        config.notes = true;
        let enabled = PrimaryProvider::with_backend(backend, &config, Prompts::default());
        let notes = enabled.build_notes("text", &KitOptions::default()).await.unwrap();
        assert_eq!(notes.value.notes[0].topic, "Cells");
    }

    #[tokio::test]
    async fn test_summary_is_plain_text() {
        let backend = CannedBackend::replying("  • **Photosynthesis** turns light into energy  ");
        let summary = provider(backend.clone())
            .summarize("text", &KitOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.value, "• **Photosynthesis** turns light into energy");
        assert!(!backend.requests.lock().unwrap()[0].json);
    }
}
