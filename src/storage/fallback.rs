// src/storage/fallback.rs

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{ExamStore, JsonFileStore, PgStore, StoreError};
use crate::models::{question::Question, submission::SubmissionRecord};

/// Routes storage calls to Postgres while it is reachable and to the local
/// JSON files otherwise.
///
/// * Reads that fail on Postgres are answered from the files.
/// * Writes go to whichever backend is active; their errors propagate.
/// * A connection-class failure marks Postgres unavailable until [`probe`]
///   succeeds again.
///
/// [`probe`]: FallbackStore::probe
pub struct FallbackStore {
    primary: Option<PgStore>,
    local: JsonFileStore,
    primary_ready: AtomicBool,
}

impl FallbackStore {
    pub fn new(primary: Option<PgStore>, local: JsonFileStore) -> Self {
        let primary_ready = AtomicBool::new(primary.is_some());
        Self {
            primary,
            local,
            primary_ready,
        }
    }

    pub fn local_only(local: JsonFileStore) -> Self {
        Self::new(None, local)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn is_primary_ready(&self) -> bool {
        self.primary.is_some() && self.primary_ready.load(Ordering::Acquire)
    }

    /// Pings Postgres and updates its availability.
    pub async fn probe(&self) {
        let Some(primary) = &self.primary else {
            return;
        };

        let reachable = primary.ping().await.is_ok();
        let was_ready = self.primary_ready.swap(reachable, Ordering::AcqRel);
        match (was_ready, reachable) {
            (false, true) => tracing::info!("Postgres reachable again, leaving local JSON storage"),
            (true, false) => {
                tracing::warn!("Postgres unreachable. Local JSON storage will be used.")
            }
            _ => {}
        }
    }

    fn active_primary(&self) -> Option<&PgStore> {
        self.primary
            .as_ref()
            .filter(|_| self.primary_ready.load(Ordering::Acquire))
    }

    fn note_failure(&self, err: &StoreError) {
        if err.is_unavailable() && self.primary_ready.swap(false, Ordering::AcqRel) {
            tracing::warn!("Postgres disconnected ({}). Local JSON storage will be used.", err);
        }
    }
}

#[async_trait]
impl ExamStore for FallbackStore {
    async fn fetch_questions(&self) -> Result<Vec<Question>, StoreError> {
        if let Some(primary) = self.active_primary() {
            match primary.fetch_questions().await {
                Ok(questions) => return Ok(questions),
                Err(e) => {
                    tracing::error!("Error fetching questions from Postgres: {}", e);
                    self.note_failure(&e);
                }
            }
        }
        self.local.fetch_questions().await
    }

    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StoreError> {
        match self.active_primary() {
            Some(primary) => primary.replace_questions(questions).await.inspect_err(|e| {
                self.note_failure(e);
            }),
            None => self.local.replace_questions(questions).await,
        }
    }

    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<bool, StoreError> {
        match self.active_primary() {
            Some(primary) => primary.insert_submission(record).await.inspect_err(|e| {
                self.note_failure(e);
            }),
            None => self.local.insert_submission(record).await,
        }
    }

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        if let Some(primary) = self.active_primary() {
            match primary.list_submissions().await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    tracing::error!("Fetch results error (Postgres): {}", e);
                    self.note_failure(&e);
                }
            }
        }
        self.local.list_submissions().await
    }
}
