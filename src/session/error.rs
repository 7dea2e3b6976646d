// src/session/error.rs

/// The question set could not be turned into an exam.
/// Terminal for the session; there is no automatic retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    #[error("Failed to load questions: {0}")]
    Unavailable(String),

    #[error("No questions available. Contact admin.")]
    NoQuestionsAvailable,
}

impl LoadFailure {
    /// Status text shown on the exam page.
    pub fn status_text(&self) -> &'static str {
        match self {
            LoadFailure::Unavailable(_) => "Failed to load questions.",
            LoadFailure::NoQuestionsAvailable => "No questions available. Contact admin.",
        }
    }
}

/// The persistence collaborator did not accept a submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionFailure {
    /// The collaborator answered but refused to store the record.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// The collaborator could not be reached.
    #[error("submission not delivered: {0}")]
    Unreachable(String),
}

impl SubmissionFailure {
    pub fn status_text(&self) -> &'static str {
        match self {
            SubmissionFailure::Rejected(_) => "Failed to submit exam.",
            SubmissionFailure::Unreachable(_) => "Server error while submitting exam.",
        }
    }
}
