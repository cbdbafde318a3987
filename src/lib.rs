//! Studykit - study kits from lecture transcripts
//!
//! Turns a transcript into a summary, suggested learning resources, a study guide
//! (key terms, concepts, flashcards), a multiple-choice quiz and detailed notes.
//!
//! # Overview
//!
//! Every artifact walks the same fallback sequence:
//! - the primary provider, an OpenAI model asked for a JSON document
//! - the secondary provider, a pool of free-text endpoints with retry and backoff,
//!   whose output is parsed back into structure
//! - the heuristic extractor, which derives everything from the transcript alone and
//!   never fails
//!
//! # Architecture
//!
//! - `kit` - Data model shared by every stage
//! - `heuristics` - Offline extraction (topic, key terms, fill-in-the-blank quiz, ...)
//! - `parser` - Free-text and JSON response parsing
//! - `provider` - Provider adapters and their transport seams
//! - `orchestrator` - Stage sequencing and tier fallback
//! - `config` - Settings, prompt templates and resolved provider configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use studykit::config::Settings;
//! use studykit::kit::{KitOptions, Transcript};
//! use studykit::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::from_settings(&settings)?;
//!
//!     let transcript = Transcript::text("Photosynthesis converts light into energy.");
//!     let kit = orchestrator.generate_kit(&transcript, &KitOptions::default()).await;
//!     println!("{}", serde_json::to_string_pretty(&kit)?);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod kit;
pub mod openai;
pub mod orchestrator;
pub mod parser;
pub mod provider;

pub use error::{Result, StudykitError};
