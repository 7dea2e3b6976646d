// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        reply::ApiReply,
        user::{AdminLoginRequest, StudentLoginRequest},
    },
    utils::hash::AdminCredentials,
};

/// Checks a student's identity fields.
///
/// There is no student directory: any non-blank name and roll number is
/// accepted, and no token is issued. The client carries the identity into the
/// exam session itself.
pub async fn student_login(
    payload: Result<Json<StudentLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    if payload.validate().is_err() {
        return Err(AppError::BadRequest("Missing fields".to_string()));
    }

    tracing::info!("Student login: {} ({})", payload.name.trim(), payload.roll_number.trim());
    Ok(Json(ApiReply::ok()))
}

/// Verifies the administrator credentials against the configured account.
pub async fn admin_login(
    State(admin): State<Arc<AdminCredentials>>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    if payload.validate().is_err() {
        return Err(AppError::AuthError("Invalid admin credentials".to_string()));
    }

    if !admin.verify(&payload.username, &payload.password)? {
        tracing::warn!("Rejected admin login for '{}'", payload.username);
        return Err(AppError::AuthError("Invalid admin credentials".to_string()));
    }

    Ok(Json(ApiReply::ok()))
}
