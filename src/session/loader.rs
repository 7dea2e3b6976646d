// src/session/loader.rs

use async_trait::async_trait;

use super::error::LoadFailure;
use crate::models::question::Question;

/// Where an exam session gets its question set from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_question_set(&self) -> Result<Vec<Question>, LoadFailure>;
}

/// Fetches the question set once. An empty set is reported instead of
/// starting a blank exam.
pub async fn load_question_set(source: &dyn QuestionSource) -> Result<Vec<Question>, LoadFailure> {
    let questions = source.fetch_question_set().await.inspect_err(|e| {
        tracing::error!("{}", e);
    })?;

    if questions.is_empty() {
        tracing::warn!("Question set is empty");
        return Err(LoadFailure::NoQuestionsAvailable);
    }

    tracing::info!("Loaded {} questions", questions.len());
    Ok(questions)
}
