// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::html::clean_html;

/// Choice labels every multiple-choice question carries.
pub const OPTION_LABELS: [&str; 4] = ["a", "b", "c", "d"];

/// Only the first few offending records are reported back to the uploader.
pub const MAX_REPORTED_RECORDS: usize = 5;

/// The four option texts of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl QuestionOptions {
    pub fn get(&self, label: &str) -> Option<&str> {
        match label.trim().to_lowercase().as_str() {
            "a" => Some(&self.a),
            "b" => Some(&self.b),
            "c" => Some(&self.c),
            "d" => Some(&self.d),
            _ => None,
        }
    }
}

/// A question as stored in the question bank and served to exam sessions.
///
/// The wire names follow the uploaded bank format (`question`, `options`,
/// `answer`); `q`, `text` and `correctAnswer` are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The prompt shown to the student.
    #[serde(rename = "question", alias = "q", alias = "text", default)]
    pub text: String,

    /// Absent for free-text questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<QuestionOptions>,

    /// Choice label (or free-text answer) considered correct.
    #[serde(rename = "answer", alias = "correctAnswer", default)]
    pub correct_answer: String,
}

impl Question {
    pub fn multiple_choice(
        text: impl Into<String>,
        options: QuestionOptions,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: Some(options),
            correct_answer: correct_answer.into(),
        }
    }

    pub fn free_text(text: impl Into<String>, correct_answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: None,
            correct_answer: correct_answer.into(),
        }
    }
}

/// Why an uploaded question bank was rejected. Nothing is stored in any case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankValidationError {
    #[error("JSON must be an array of question objects.")]
    NotAnArray,

    #[error("The array is empty.")]
    Empty,

    #[error("Invalid question bank: {}", .0.join(" | "))]
    InvalidRecords(Vec<String>),
}

/// Validates an uploaded question bank and normalizes it for storage.
///
/// Accepts only a non-empty array where every record has question text, four
/// non-blank options `a`..`d` and an answer label among them. Returns the
/// whole bank or nothing.
pub fn validate_question_bank(raw: &Value) -> Result<Vec<Question>, BankValidationError> {
    let entries = raw.as_array().ok_or(BankValidationError::NotAnArray)?;
    if entries.is_empty() {
        return Err(BankValidationError::Empty);
    }

    let mut questions = Vec::with_capacity(entries.len());
    let mut report = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        match check_record(entry) {
            Ok(question) => questions.push(question),
            Err(issues) => report.push(format!("Q{}: {}", idx + 1, issues.join("; "))),
        }
    }

    if !report.is_empty() {
        report.truncate(MAX_REPORTED_RECORDS);
        return Err(BankValidationError::InvalidRecords(report));
    }

    Ok(questions)
}

fn check_record(entry: &Value) -> Result<Question, Vec<String>> {
    let mut issues = Vec::new();

    let text = ["question", "q", "text"]
        .iter()
        .find_map(|key| entry.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty());
    if text.is_none() {
        issues.push("missing 'question' text".to_string());
    }

    let options = match entry.get("options").and_then(Value::as_object) {
        None => {
            issues.push("missing 'options' object".to_string());
            None
        }
        Some(map) => {
            let mut texts = Vec::with_capacity(OPTION_LABELS.len());
            for label in OPTION_LABELS {
                match map.get(label).and_then(scalar_text) {
                    Some(option) => texts.push(clean_html(&option)),
                    None => issues.push(format!("option '{}' is empty", label)),
                }
            }
            <[String; 4]>::try_from(texts)
                .ok()
                .map(|[a, b, c, d]| QuestionOptions { a, b, c, d })
        }
    };

    let answer = ["answer", "correctAnswer"]
        .iter()
        .find_map(|key| entry.get(key))
        .and_then(scalar_text)
        .map(|answer| answer.to_lowercase())
        .filter(|answer| OPTION_LABELS.contains(&answer.as_str()));
    if answer.is_none() {
        issues.push("answer must be one of a/b/c/d".to_string());
    }

    match (text, options, answer) {
        (Some(text), Some(options), Some(answer)) if issues.is_empty() => {
            Ok(Question::multiple_choice(clean_html(text), options, answer))
        }
        _ => Err(issues),
    }
}

/// Trimmed, non-empty rendering of a JSON scalar.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
