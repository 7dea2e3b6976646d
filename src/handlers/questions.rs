// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{question::validate_question_bank, reply::ApiReply},
    storage::ExamStore,
};

/// Multipart field carrying the question bank file.
const UPLOAD_FIELD: &str = "file";

/// Returns the whole question bank, answer keys included.
/// Scoring happens in the exam session, so the key ships with the questions.
pub async fn list_questions(
    State(store): State<Arc<dyn ExamStore>>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store.fetch_questions().await?;
    Ok(Json(questions))
}

/// Replaces the question bank with an uploaded JSON file.
///
/// * Expects a multipart form with the file under `file`.
/// * The file must hold a non-empty array of valid questions.
/// * Any failure leaves the stored bank untouched.
pub async fn upload_questions(
    State(store): State<Arc<dyn ExamStore>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let bytes = upload.ok_or_else(|| AppError::BadRequest("No file uploaded.".to_string()))?;

    let raw: serde_json::Value = serde_json::from_slice(&bytes)?;
    let questions = validate_question_bank(&raw).map_err(|e| {
        tracing::warn!("Rejected question bank upload: {}", e);
        AppError::BadRequest(e.to_string())
    })?;

    store.replace_questions(&questions).await.map_err(|e| {
        tracing::error!("Upload questions error: {}", e);
        AppError::ServiceUnavailable("Unable to store the question bank.".to_string())
    })?;

    tracing::info!("Question bank replaced ({} questions)", questions.len());
    Ok(Json(ApiReply::ok()))
}
