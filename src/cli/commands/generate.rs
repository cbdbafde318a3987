//! Generate command implementation.

use crate::cli::render::render_markdown;
use crate::cli::Output;
use crate::config::Settings;
use crate::heuristics::extract_topic;
use crate::kit::{KitOptions, SourceKind, Transcript};
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};
use chrono::Local;

/// Output format of a generated kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for KitFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(KitFormat::Json),
            "markdown" | "md" => Ok(KitFormat::Markdown),
            _ => Err(format!("Unknown format: {} (expected json or markdown)", s)),
        }
    }
}

/// Per-run overrides of the configured generation options.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub max_bullets: Option<usize>,
    pub max_resources: Option<usize>,
    pub num_questions: Option<usize>,
    pub max_sections: Option<usize>,
}

impl OptionOverrides {
    pub fn apply(&self, base: &KitOptions) -> KitOptions {
        KitOptions {
            max_bullets: self.max_bullets.unwrap_or(base.max_bullets),
            max_resources: self.max_resources.unwrap_or(base.max_resources),
            num_questions: self.num_questions.unwrap_or(base.num_questions),
            max_sections: self.max_sections.unwrap_or(base.max_sections),
            study_guide_items: base.study_guide_items,
        }
    }
}

/// Read the transcript from a file, stdin (`-`) or the argument itself.
pub fn read_transcript(input: &str, inline: bool, source: SourceKind) -> Result<Transcript> {
    let text = if inline {
        input.to_string()
    } else if input == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read transcript from stdin")?
    } else {
        let path = Settings::expand_path(input);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read transcript {}", path.display()))?
    };
    Ok(Transcript::new(text, source))
}

/// Run the generate command.
pub async fn run_generate(
    input: &str,
    inline: bool,
    source: &str,
    format: &str,
    output: Option<String>,
    overrides: OptionOverrides,
    settings: Settings,
) -> Result<()> {
    let source: SourceKind = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let format: KitFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let transcript = read_transcript(input, inline, source)?;
    let options = overrides.apply(&settings.generation);
    let orchestrator = Orchestrator::from_settings(&settings)?;

    let spinner = Output::spinner("Generating study kit...");
    let result = orchestrator.generate_kit(&transcript, &options).await;
    spinner.finish_and_clear();

    if result.success {
        Output::success("Study kit generated");
        for (kind, tier) in &result.served_by {
            Output::served(*kind, *tier);
        }
    }

    let rendered = match format {
        KitFormat::Json => serde_json::to_string_pretty(&result)?,
        KitFormat::Markdown => {
            let title = format!("Study Kit: {}", extract_topic(&transcript.text));
            render_markdown(&result, &title, Local::now())
        }
    };

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &rendered).with_context(|| format!("Failed to write {}", path))?;
            Output::success(&format!("Wrote {}", path));
        }
        _ => println!("{}", rendered),
    }

    if !result.success {
        let error = result.error.unwrap_or_else(|| "Study kit generation failed".to_string());
        Output::error(&error);
        anyhow::bail!(error);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<KitFormat>().unwrap(), KitFormat::Json);
        assert_eq!("md".parse::<KitFormat>().unwrap(), KitFormat::Markdown);
        assert!("pdf".parse::<KitFormat>().is_err());
    }

    #[test]
    fn test_overrides_keep_unset_options() {
        let base = KitOptions::default();
        let options = OptionOverrides {
            num_questions: Some(2),
            ..Default::default()
        }
        .apply(&base);

        assert_eq!(options.num_questions, 2);
        assert_eq!(options.max_bullets, base.max_bullets);
        assert_eq!(options.study_guide_items, base.study_guide_items);
    }

    #[test]
    fn test_read_transcript_inline() {
        let transcript = read_transcript("Cells divide.", true, SourceKind::Text).unwrap();
        assert_eq!(transcript.text, "Cells divide.");
        assert_eq!(transcript.source, SourceKind::Text);
    }

    #[test]
    fn test_read_transcript_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Glucose is produced.").unwrap();

        let transcript = read_transcript(file.path().to_str().unwrap(), false, SourceKind::File).unwrap();
        assert_eq!(transcript.text, "Glucose is produced.");
    }

    #[test]
    fn test_read_transcript_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(read_transcript(missing.to_str().unwrap(), false, SourceKind::File).is_err());
    }
}
