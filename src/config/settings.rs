//! Configuration settings for Studykit.

use crate::kit::KitOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub primary: PrimarySettings,
    pub secondary: SecondarySettings,
    pub generation: KitOptions,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Transcripts longer than this are cut before any provider call.
    pub max_transcript_chars: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            max_transcript_chars: 10_000,
        }
    }
}

/// Schema-constrained provider (OpenAI chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimarySettings {
    /// Set to false to skip the primary provider entirely.
    pub enabled: bool,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Token limit for summary and resource requests.
    pub short_max_tokens: u32,
    /// Token limit for study guide, quiz and notes requests.
    pub long_max_tokens: u32,
    /// Also ask the primary provider for detailed notes. Off by default: notes normally
    /// come from the free-text provider or the heuristics.
    pub notes: bool,
}

impl Default for PrimarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            short_max_tokens: 1000,
            long_max_tokens: 2000,
            notes: false,
        }
    }
}

/// Free-text provider backed by a pool of inference endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondarySettings {
    pub enabled: bool,
    /// Interchangeable text-generation endpoints; one is picked per attempt.
    pub endpoints: Vec<String>,
    /// Environment variable holding the optional bearer token.
    pub token_env: String,
    pub timeout_secs: u64,
    /// Attempts per call, including the first. Values above 3 are capped.
    pub max_attempts: u32,
    /// Backoff unit in milliseconds; the wait is `unit * (2^attempt + jitter)`.
    pub backoff_base_ms: u64,
    pub max_length: u32,
    pub temperature: f32,
    /// Substitute heuristic study guides and quizzes when no endpoint answers.
    pub heuristic_on_unreachable: bool,
}

impl Default for SecondarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoints: vec![
                "https://api-inference.huggingface.co/models/google/flan-t5-xxl".to_string(),
                "https://api-inference.huggingface.co/models/facebook/bart-large-cnn".to_string(),
                "https://api-inference.huggingface.co/models/t5-base".to_string(),
            ],
            token_env: "HUGGINGFACE_API_KEY".to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            backoff_base_ms: 1000,
            max_length: 500,
            temperature: 0.7,
            heuristic_on_unreachable: true,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StudykitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studykit")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.max_transcript_chars, 10_000);
        assert_eq!(settings.primary.model, "gpt-4o");
        assert_eq!(settings.secondary.endpoints.len(), 3);
        assert_eq!(settings.secondary.max_attempts, 3);
        assert!(settings.secondary.heuristic_on_unreachable);
        assert_eq!(settings.generation.max_bullets, 7);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[secondary]\nmax_attempts = 2\n\n[generation]\nnum_questions = 10\n").unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.secondary.max_attempts, 2);
        assert_eq!(settings.secondary.timeout_secs, 10);
        assert_eq!(settings.generation.num_questions, 10);
        assert_eq!(settings.generation.max_resources, 3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.primary.enabled = false;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert!(!loaded.primary.enabled);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.general.log_level, "warn");
    }
}
