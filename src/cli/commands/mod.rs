//! CLI command implementations.

mod config;
mod doctor;
mod generate;
mod serve;
mod topic;

pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::{read_transcript, run_generate, KitFormat, OptionOverrides};
pub use serve::run_serve;
pub use topic::run_topic;
