// src/models/submission.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final answers keyed by question position (`"Q1"`, `"Q2"`, ...).
pub type AnswerMap = BTreeMap<String, String>;

/// DTO for submitting an exam attempt.
/// The score is computed by the exam session before transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub score: i64,
    /// Idempotency key generated once per exam session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A persisted exam submission, as listed on the admin results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Assigned by the server when the submission is received.
    #[serde(default)]
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn received(request: SubmitExamRequest, submitted_at: DateTime<Utc>) -> Self {
        Self {
            name: request.name,
            roll_number: request.roll_number,
            answers: request.answers,
            score: request.score,
            session_id: request.session_id,
            submitted_at,
        }
    }
}
