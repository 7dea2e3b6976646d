// src/models/user.rs

use serde::Deserialize;
use validator::Validate;

/// DTO for student login.
/// Both identity fields are carried opaquely into the exam session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank), length(max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = not_blank), length(max = 50))]
    pub roll_number: String,
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("missing_field"));
    }
    Ok(())
}
