//! CLI module for Studykit.

pub mod commands;
mod output;
pub mod render;

pub use output::{mask_secret, Output};

use clap::{Parser, Subcommand};

/// Studykit - study kits from lecture transcripts
///
/// Turns a transcript into a summary, learning resources, a study guide, a quiz and
/// detailed notes. Works offline: when no AI provider answers, heuristics fill in.
#[derive(Parser, Debug)]
#[command(name = "studykit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a study kit from a transcript
    Generate {
        /// Transcript file path, or '-' to read stdin
        input: String,

        /// Treat INPUT as the transcript text itself instead of a path
        #[arg(long)]
        text: bool,

        /// Where the transcript came from (text, youtube, audio, file)
        #[arg(long, default_value = "file")]
        source: String,

        /// Output format (json, markdown)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum number of summary bullets
        #[arg(long)]
        max_bullets: Option<usize>,

        /// Number of suggested resources
        #[arg(long)]
        max_resources: Option<usize>,

        /// Number of quiz questions
        #[arg(short = 'q', long)]
        num_questions: Option<usize>,

        /// Number of note sections
        #[arg(long)]
        max_sections: Option<usize>,
    },

    /// Print the topic extracted from a transcript
    Topic {
        /// Transcript file path, or '-' to read stdin
        input: String,

        /// Treat INPUT as the transcript text itself instead of a path
        #[arg(long)]
        text: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check provider credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
