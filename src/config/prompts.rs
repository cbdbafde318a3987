//! Prompt templates for Studykit.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory,
//! one file per artifact kind (`summary.toml`, `resources.toml`, `study_guide.toml`,
//! `quiz.toml`, `notes.toml`), each with optional `structured` and `free_text` keys.

use crate::kit::ArtifactKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub summary: ArtifactPrompts,
    pub resources: ArtifactPrompts,
    pub study_guide: ArtifactPrompts,
    pub quiz: ArtifactPrompts,
    pub notes: ArtifactPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// The two prompt flavours for one artifact kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactPrompts {
    /// Sent to the primary provider, which answers with a JSON document.
    pub structured: String,
    /// Sent to the free-text endpoints.
    pub free_text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ArtifactPromptsOverride {
    structured: Option<String>,
    free_text: Option<String>,
}

impl ArtifactPrompts {
    fn new(structured: &str, free_text: &str) -> Self {
        Self {
            structured: structured.to_string(),
            free_text: free_text.to_string(),
        }
    }

    fn apply(&mut self, overrides: ArtifactPromptsOverride) {
        if let Some(structured) = overrides.structured {
            self.structured = structured;
        }
        if let Some(free_text) = overrides.free_text {
            self.free_text = free_text;
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            summary: ArtifactPrompts::new(
                r#"Create a comprehensive summary of the key concepts and important information from the following text:

{{text}}

Your summary should:
1. Identify and emphasize the most important concepts (maximum {{max_bullets}} main points)
2. Organize information hierarchically with main points and sub-points where appropriate
3. Use clear, concise bullet points (• for main points, - for sub-points)
4. Highlight key terms or technical concepts in bold using markdown (**term**)
5. Cover all critical information without redundancy

Format the output as a structured, hierarchical list of bullet points."#,
                "Summarize the following text into {{max_bullets}} bullet points, highlighting the key concepts:\n\n{{text}}",
            ),
            resources: ArtifactPrompts::new(
                r#"Find {{max_resources}} high-quality learning resources on the topic: "{{topic}}"

Only suggest real, reliable resources from well-known educational sources such as
Khan Academy, Coursera, edX, MIT OpenCourseWare, Stanford Online, YouTube educational
channels or TED Talks.

For each resource provide a specific title, a one or two sentence description, a valid
URL to the resource and its type (video, course, article, book, ...).

Respond with JSON of this shape:
{"resources": [{"title": "...", "description": "...", "url": "https://...", "type": "..."}]}"#,
                "Suggest {{max_resources}} educational resources about '{{topic}}'. For each resource, provide: title, type (video, article, book, etc.), a brief description, and a URL. Format as JSON list.",
            ),
            study_guide: ArtifactPrompts::new(
                r#"Create a comprehensive study guide based on the following text:

{{text}}

Include key terms with definitions, important concepts, and flashcards (question on the
front, answer on the back). Give at most {{study_guide_items}} entries per section.

Respond with JSON of this shape:
{"study_guide": {
  "key_terms": [{"term": "...", "definition": "..."}],
  "important_concepts": ["..."],
  "flashcards": [{"question": "...?", "answer": "..."}]
}}"#,
                "Create a study guide from this text with: 1. {{study_guide_items}} key terms with definitions, 2. {{study_guide_items}} important concepts, 3. {{study_guide_items}} flashcards (question-answer pairs):\n\n{{text}}",
            ),
            quiz: ArtifactPrompts::new(
                r#"Create {{num_questions}} multiple-choice questions based on this text:

{{text}}

Each question needs the question text, four options labelled A, B, C and D, the letter
of the correct answer and a short explanation of why it is correct.

Respond with JSON of this shape:
{"quiz": [{"question": "...?", "options": {"A": "...", "B": "...", "C": "...", "D": "..."}, "correct_answer": "A", "explanation": "..."}]}"#,
                "Create {{num_questions}} multiple-choice quiz questions based on this text. For each question, provide 4 options (A, B, C, D), indicate the correct answer, and give a brief explanation for the answer:\n\n{{text}}",
            ),
            notes: ArtifactPrompts::new(
                r#"Write detailed study notes for the following text, split into at most {{max_sections}} sections:

{{text}}

For each section give a title, a one sentence definition, key points, explanatory content,
examples, and references to any diagrams or figures mentioned.

Respond with JSON of this shape:
{"notes": [{"topic": "...", "definition": "...", "key_points": ["..."], "content": "...", "examples": ["..."], "diagram_references": ["..."]}]}"#,
                "Write study notes for this text in {{max_sections}} sections. Start each section with a '## Title' line, then 'Definition:', 'Key Points:', 'Examples:' and 'Diagrams:' lines:\n\n{{text}}",
            ),
            variables: HashMap::new(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            for kind in [
                ArtifactKind::Summary,
                ArtifactKind::Resources,
                ArtifactKind::StudyGuide,
                ArtifactKind::Quiz,
                ArtifactKind::Notes,
            ] {
                let path = custom_path.join(format!("{}.toml", kind.payload_key()));
                if path.exists() {
                    let content = std::fs::read_to_string(&path)?;
                    let overrides: ArtifactPromptsOverride = toml::from_str(&content)?;
                    prompts.for_kind_mut(kind).apply(overrides);
                }
            }
        }

        Ok(prompts)
    }

    pub fn for_kind(&self, kind: ArtifactKind) -> &ArtifactPrompts {
        match kind {
            ArtifactKind::Summary => &self.summary,
            ArtifactKind::Resources => &self.resources,
            ArtifactKind::StudyGuide => &self.study_guide,
            ArtifactKind::Quiz => &self.quiz,
            ArtifactKind::Notes => &self.notes,
        }
    }

    fn for_kind_mut(&mut self, kind: ArtifactKind) -> &mut ArtifactPrompts {
        match kind {
            ArtifactKind::Summary => &mut self.summary,
            ArtifactKind::Resources => &mut self.resources,
            ArtifactKind::StudyGuide => &mut self.study_guide,
            ArtifactKind::Quiz => &mut self.quiz,
            ArtifactKind::Notes => &mut self.notes,
        }
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
