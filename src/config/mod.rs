//! Configuration module for Studykit.
//!
//! Handles loading application settings and prompt templates, and resolving them into
//! the provider configuration handed to the orchestrator.

mod prompts;
mod provider;
mod settings;

pub use prompts::{ArtifactPrompts, Prompts};
pub use provider::{PrimaryConfig, ProviderConfig, RetryConfig, SecondaryConfig, MAX_ATTEMPTS};
pub use settings::{GeneralSettings, PrimarySettings, PromptSettings, SecondarySettings, Settings};
