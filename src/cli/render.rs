//! Markdown rendering of a study kit.

use crate::kit::{Notes, PipelineResult, Quiz, ResourceList, StudyGuide};
use chrono::{DateTime, Local};
use std::fmt::Write;

/// Render a pipeline result as a markdown document.
///
/// Missing artifacts in a successful kit render as a short placeholder line, never as an error.
pub fn render_markdown(result: &PipelineResult, title: &str, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out);
    let _ = writeln!(out, "_Generated {}_", generated_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out);

    if !result.success {
        let error = result.error.as_deref().unwrap_or("unknown error");
        let _ = writeln!(out, "> Generation failed: {}", error);
        return out;
    }

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    match &result.summary {
        Some(summary) => {
            let _ = writeln!(out, "{}", summary.trim());
        }
        None => placeholder(&mut out),
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Resources");
    let _ = writeln!(out);
    match &result.resources {
        Some(resources) if !resources.is_empty() => render_resources(&mut out, resources),
        _ => placeholder(&mut out),
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Study Guide");
    let _ = writeln!(out);
    match &result.study_guide {
        Some(doc) if !doc.study_guide.is_empty() => render_study_guide(&mut out, &doc.study_guide),
        _ => placeholder(&mut out),
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Quiz");
    let _ = writeln!(out);
    match &result.quiz {
        Some(quiz) if !quiz.is_empty() => render_quiz(&mut out, quiz),
        _ => placeholder(&mut out),
    }

    if let Some(notes) = result.detailed_notes.as_ref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Detailed Notes");
        render_notes(&mut out, notes);
    }

    out
}

fn placeholder(out: &mut String) {
    let _ = writeln!(out, "_Not available._");
}

fn render_resources(out: &mut String, resources: &ResourceList) {
    for item in &resources.resources {
        let _ = writeln!(
            out,
            "- [{}]({}) ({}): {}",
            item.title, item.url, item.resource_type, item.description
        );
    }
}

fn render_study_guide(out: &mut String, guide: &StudyGuide) {
    if !guide.key_terms.is_empty() {
        let _ = writeln!(out, "### Key Terms");
        let _ = writeln!(out);
        for kt in &guide.key_terms {
            let _ = writeln!(out, "- **{}**: {}", kt.term, kt.definition);
        }
        let _ = writeln!(out);
    }

    if !guide.important_concepts.is_empty() {
        let _ = writeln!(out, "### Important Concepts");
        let _ = writeln!(out);
        for concept in &guide.important_concepts {
            let _ = writeln!(out, "- {}", concept);
        }
        let _ = writeln!(out);
    }

    if !guide.flashcards.is_empty() {
        let _ = writeln!(out, "### Flashcards");
        let _ = writeln!(out);
        for card in &guide.flashcards {
            let _ = writeln!(out, "- **Q:** {}", card.question);
            let _ = writeln!(out, "  **A:** {}", card.answer);
        }
    }
}

fn render_quiz(out: &mut String, quiz: &Quiz) {
    for (i, question) in quiz.quiz.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, question.question);
        for (label, text) in question.options.iter() {
            let _ = writeln!(out, "   - {}) {}", label.as_char(), text);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "### Answer Key");
    let _ = writeln!(out);
    for (i, question) in quiz.quiz.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}) {}: {}",
            i + 1,
            question.correct_answer.as_char(),
            question.correct_text(),
            question.explanation
        );
    }
}

fn render_notes(out: &mut String, notes: &Notes) {
    for section in &notes.notes {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", section.topic);
        let _ = writeln!(out);
        if !section.definition.is_empty() {
            let _ = writeln!(out, "**Definition:** {}", section.definition);
            let _ = writeln!(out);
        }
        for point in &section.key_points {
            let _ = writeln!(out, "- {}", point);
        }
        if !section.content.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", section.content);
        }
        if !section.examples.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Examples: {}", section.examples.join("; "));
        }
        if !section.diagram_references.is_empty() {
            let _ = writeln!(out, "Diagrams: {}", section.diagram_references.join("; "));
        }
    }
}
