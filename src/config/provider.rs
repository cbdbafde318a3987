//! Provider configuration resolved once at startup.

use super::Settings;
use std::time::Duration;

/// Everything the orchestrator needs to build its adapters: credentials, endpoint pool, timeouts.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub primary: PrimaryConfig,
    pub secondary: SecondaryConfig,
    /// Transcripts are cut to this many characters before any provider call.
    pub max_transcript_chars: usize,
}

#[derive(Clone)]
pub struct PrimaryConfig {
    pub enabled: bool,
    /// Absent key is not an error; the primary adapter then fails fast on every call.
    pub api_key: Option<String>,
    /// Name of the variable the key was read from, for error messages.
    pub api_key_env: String,
    pub model: String,
    pub timeout: Duration,
    pub short_max_tokens: u32,
    pub long_max_tokens: u32,
    pub notes: bool,
}

#[derive(Clone)]
pub struct SecondaryConfig {
    pub enabled: bool,
    pub endpoints: Vec<String>,
    pub token: Option<String>,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub max_length: u32,
    pub temperature: f32,
    pub heuristic_on_unreachable: bool,
}

/// Hard ceiling on attempts per free-text call, whatever the settings ask for.
pub const MAX_ATTEMPTS: u32 = 3;

/// Retry policy of the free-text endpoint pool.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Backoff unit; rate-limited attempt `n` waits `unit * (2^n + jitter)`.
    pub backoff_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Wait before retrying after rate-limited attempt `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32, jitter: f64) -> Duration {
        let factor = 2f64.powi(attempt.min(16) as i32) + jitter.clamp(0.0, 1.0);
        self.backoff_unit.mul_f64(factor)
    }
}

impl ProviderConfig {
    /// Resolve credentials from the environment.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_settings_with(settings, |name| std::env::var(name).ok())
    }

    /// Resolve credentials through `lookup` instead of the process environment.
    pub fn from_settings_with(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let primary = &settings.primary;
        let secondary = &settings.secondary;

        Self {
            primary: PrimaryConfig {
                enabled: primary.enabled,
                api_key: non_empty(&primary.api_key_env),
                api_key_env: primary.api_key_env.clone(),
                model: primary.model.clone(),
                timeout: Duration::from_secs(primary.timeout_secs),
                short_max_tokens: primary.short_max_tokens,
                long_max_tokens: primary.long_max_tokens,
                notes: primary.notes,
            },
            secondary: SecondaryConfig {
                enabled: secondary.enabled,
                endpoints: secondary.endpoints.clone(),
                token: non_empty(&secondary.token_env),
                timeout: Duration::from_secs(secondary.timeout_secs),
                retry: RetryConfig {
                    max_attempts: secondary.max_attempts.clamp(1, MAX_ATTEMPTS),
                    backoff_unit: Duration::from_millis(secondary.backoff_base_ms),
                },
                max_length: secondary.max_length,
                temperature: secondary.temperature,
                heuristic_on_unreachable: secondary.heuristic_on_unreachable,
            },
            max_transcript_chars: settings.general.max_transcript_chars,
        }
    }

    /// True when the primary adapter can actually issue requests.
    pub fn primary_available(&self) -> bool {
        self.primary.enabled && self.primary.api_key.is_some()
    }
}

// Keys stay out of debug output.
impl std::fmt::Debug for PrimaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl std::fmt::Debug for SecondaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondaryConfig")
            .field("enabled", &self.enabled)
            .field("endpoints", &self.endpoints)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_an_error() {
        let config = ProviderConfig::from_settings_with(&Settings::default(), |_| None);
        assert!(config.primary.api_key.is_none());
        assert!(!config.primary_available());
        assert_eq!(config.secondary.endpoints.len(), 3);
        assert_eq!(config.secondary.retry.max_attempts, 3);
    }

    #[test]
    fn test_keys_resolved_and_hidden() {
        let config = ProviderConfig::from_settings_with(&Settings::default(), |name| match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "HUGGINGFACE_API_KEY" => Some("  ".to_string()),
            _ => None,
        });
        assert!(config.primary_available());
        assert!(config.secondary.token.is_none());
        assert!(!format!("{:?}", config).contains("sk-test"));
    }

    #[test]
    fn test_attempts_clamped_to_ceiling() {
        let resolve = |max_attempts| {
            let mut settings = Settings::default();
            settings.secondary.max_attempts = max_attempts;
            ProviderConfig::from_settings_with(&settings, |_| None).secondary.retry.max_attempts
        };
        assert_eq!(resolve(8), MAX_ATTEMPTS);
        assert_eq!(resolve(2), 2);
        assert_eq!(resolve(0), 1);
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let retry = RetryConfig {
            max_attempts: 3,
            backoff_unit: Duration::from_millis(100),
        };
        assert_eq!(retry.backoff(0, 0.0), Duration::from_millis(100));
        assert_eq!(retry.backoff(2, 0.5), Duration::from_millis(450));

        let zero = RetryConfig {
            max_attempts: 3,
            backoff_unit: Duration::ZERO,
        };
        assert_eq!(zero.backoff(5, 1.0), Duration::ZERO);
    }
}
