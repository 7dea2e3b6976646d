// src/handlers/submissions.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        reply::ApiReply,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
    storage::ExamStore,
};

/// Stores one exam submission, stamping it with the receive time.
///
/// A submission whose session id is already stored is acknowledged without
/// creating a second record.
pub async fn submit_exam(
    State(store): State<Arc<dyn ExamStore>>,
    req: Result<Json<SubmitExamRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = req?;
    let record = SubmissionRecord::received(req, Utc::now());

    let created = store.insert_submission(&record).await.map_err(|e| {
        tracing::error!("Submit exam error: {}", e);
        AppError::ServiceUnavailable("Unable to store submission. Please try again.".to_string())
    })?;

    if created {
        tracing::info!(
            "Stored submission for {} ({}), score {}",
            record.name,
            record.roll_number,
            record.score
        );
    } else {
        tracing::info!(
            "Duplicate submission for session {:?} ignored",
            record.session_id
        );
    }

    Ok(Json(ApiReply::ok()))
}

/// Lists every stored submission for the admin results page.
pub async fn list_results(
    State(store): State<Arc<dyn ExamStore>>,
) -> Result<impl IntoResponse, AppError> {
    let records = store.list_submissions().await?;
    Ok(Json(records))
}
