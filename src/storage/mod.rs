// src/storage/mod.rs

pub mod fallback;
pub mod json_file;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{question::Question, submission::SubmissionRecord};

pub use fallback::FallbackStore;
pub use json_file::JsonFileStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored data: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the backend itself is unreachable rather than the query being bad.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        )
    }
}

/// Persistence for the question bank and exam submissions.
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// The full question bank, in upload order.
    async fn fetch_questions(&self) -> Result<Vec<Question>, StoreError>;

    /// Replaces the whole bank. Either every question is stored or none.
    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StoreError>;

    /// Appends a submission. Returns `false` when a record with the same
    /// session id is already stored.
    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<bool, StoreError>;

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, StoreError>;
}
