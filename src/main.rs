//! Studykit CLI entry point.

use anyhow::Result;
use clap::Parser;
use studykit::cli::commands::{self, OptionOverrides};
use studykit::cli::{Cli, Commands};
use studykit::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("studykit={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Execute command
    match cli.command {
        Commands::Generate {
            input,
            text,
            source,
            format,
            output,
            max_bullets,
            max_resources,
            num_questions,
            max_sections,
        } => {
            let overrides = OptionOverrides {
                max_bullets,
                max_resources,
                num_questions,
                max_sections,
            };
            commands::run_generate(&input, text, &source, &format, output, overrides, settings).await?;
        }

        Commands::Topic { input, text } => {
            commands::run_topic(&input, text)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
