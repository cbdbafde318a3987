use super::{entries, string_field};
use crate::kit::{OptionLabel, QuizOptions, QuizQuestion};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Start of a numbered question, e.g. `1.`, `2)`, `Q3:`, `Question 4.`.
static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:\*\*)?(?:q(?:uestion)?\s*)?\d+\s*[.):]\s*").expect("valid regex")
});

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\(?([A-Da-d])\s*[.):]\s+(.+?)\s*$").expect("valid regex"));

static INLINE_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\(?([A-D])[.)]\s+").expect("valid regex"));

/// Answer letter on the same line as its keyword. Lowercase letters only count after `:` or `-`.
static ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:correct[ \t]+answer|correct|answer)[ \t]*(?:is[ \t]*)?(?:[:\-][ \t]*\(?([a-d])|\(?(?-i:([A-D])))\b",
    )
    .expect("valid regex")
});

/// Whole answer line, for answers given as option text (`Answer: Light`).
static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:\*\*)?(?:correct[ \t]+answer|answer)(?:\*\*)?[ \t]*(?:is[ \t]*)?[:\-][ \t]*(.+?)[ \t]*$")
        .expect("valid regex")
});

static EXPLANATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:explanation|reason(?:ing)?)[^:\n]*:\s*([^\n]+)").expect("valid regex"));

/// Leading label on an option text, e.g. `A) ` or `(b). `.
static LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?[A-Da-d]\s*[.):]\s+").expect("valid regex"));

const DEFAULT_EXPLANATION: &str = "See the text for details.";

/// Parse numbered multiple-choice questions out of free text, keeping at most `n`.
///
/// Missing options are padded, a missing answer defaults to `A` and a missing
/// explanation gets a generic one.
pub fn parse_quiz(text: &str, n: usize) -> Vec<QuizQuestion> {
    let blocks: Vec<&str> = if QUESTION_START.is_match(text) {
        QUESTION_START.split(text).skip(1).collect()
    } else {
        vec![text]
    };

    blocks
        .into_iter()
        .filter_map(parse_block)
        .take(n)
        .collect()
}

fn parse_block(block: &str) -> Option<QuizQuestion> {
    let block = block.trim();
    let question_line = block.lines().next()?;
    let question = question_line.replace("**", "").trim().to_string();
    if question.is_empty() || OPTION_LINE.is_match(question_line) {
        return None;
    }

    let body = &block[question_line.len()..];
    let mut options = BTreeMap::new();
    for caps in OPTION_LINE.captures_iter(body) {
        if let Some(label) = caps[1].chars().next().and_then(OptionLabel::from_char) {
            options.entry(label).or_insert_with(|| caps[2].to_string());
        }
    }
    if options.len() < 2 {
        options = inline_options(body);
    }
    if options.is_empty() {
        return None;
    }

    let options = QuizOptions::from_partial(options);
    let correct_answer = ANSWER
        .captures(body)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|m| m.as_str().chars().next())
        .and_then(OptionLabel::from_char)
        .or_else(|| {
            ANSWER_LINE
                .captures(body)
                .and_then(|caps| answer_label(caps[1].trim_matches('*').trim(), &options))
        })
        .unwrap_or(OptionLabel::A);
    let explanation = EXPLANATION
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    Some(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

/// Options written on one line: `A) x B) y C) z D) w`.
fn inline_options(body: &str) -> BTreeMap<OptionLabel, String> {
    let line = body
        .lines()
        .find(|line| INLINE_OPTION.find_iter(line).count() >= 2)
        .unwrap_or_default();

    let markers: Vec<(OptionLabel, usize, usize)> = INLINE_OPTION
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps[1].chars().next().and_then(OptionLabel::from_char)?;
            Some((label, whole.start(), whole.end()))
        })
        .collect();

    let mut options = BTreeMap::new();
    for (i, (label, _, text_start)) in markers.iter().enumerate() {
        let text_end = markers.get(i + 1).map(|(_, start, _)| *start).unwrap_or(line.len());
        let text = line[*text_start..text_end].trim();
        if !text.is_empty() {
            options.entry(*label).or_insert_with(|| text.to_string());
        }
    }
    options
}

/// Normalize a structured quiz payload (the value under `quiz`), keeping at most `n`.
///
/// Options may be an object keyed by label or a list in label order; the correct
/// answer may be a label or the text of the correct option.
pub fn normalize_quiz(value: &Value, n: usize) -> Vec<QuizQuestion> {
    entries(value, "questions", &["question"])
        .into_iter()
        .filter_map(normalize_question)
        .take(n)
        .collect()
}

fn normalize_question(entry: &Value) -> Option<QuizQuestion> {
    let question = string_field(entry, &["question", "prompt", "text"])?;

    let mut partial = BTreeMap::new();
    match entry.get("options").or_else(|| entry.get("choices")) {
        Some(Value::Object(map)) => {
            for (key, text) in map {
                if let (Some(label), Some(text)) = (label_from_key(key), text.as_str()) {
                    partial.insert(label, text.to_string());
                }
            }
        }
        Some(Value::Array(items)) => {
            for (label, text) in OptionLabel::ALL.into_iter().zip(items.iter().filter_map(Value::as_str)) {
                partial.insert(label, LABEL_PREFIX.replace(text, "").to_string());
            }
        }
        _ => {}
    }
    let options = QuizOptions::from_partial(partial);

    let correct_answer = string_field(entry, &["correct_answer", "answer", "correct"])
        .and_then(|answer| answer_label(&answer, &options))
        .unwrap_or(OptionLabel::A);
    let explanation =
        string_field(entry, &["explanation", "reason"]).unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    Some(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

/// `"A"`, `"a)"`, `"Option B"` -> label.
fn label_from_key(key: &str) -> Option<OptionLabel> {
    let key = key.trim();
    let key = key
        .strip_prefix("Option")
        .or_else(|| key.strip_prefix("option"))
        .unwrap_or(key)
        .trim()
        .trim_end_matches(['.', ')', ':']);
    key.parse().ok()
}

fn answer_label(answer: &str, options: &QuizOptions) -> Option<OptionLabel> {
    label_from_key(answer)
        .or_else(|| options.label_of(answer))
        .or_else(|| {
            LABEL_PREFIX
                .find(answer)
                .and_then(|m| m.as_str().chars().find(|c| c.is_ascii_alphabetic()))
                .and_then(OptionLabel::from_char)
        })
}
