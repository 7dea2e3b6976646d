// src/client.rs

//! HTTP client for the exam API.
//!
//! Used by exam sessions as their question source and submission sink, and by
//! admin tooling for uploads and result listings.

use std::env;

use async_trait::async_trait;
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    models::{
        question::{BankValidationError, Question, validate_question_bank},
        reply::ApiReply,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
    session::{LoadFailure, QuestionSource, SessionContext, SubmissionFailure, SubmissionSink},
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// `API_BASE_URL`, else `BACKEND_URL`, else the local default. A trailing
/// slash is dropped.
pub fn api_base_url_from_env() -> String {
    ["API_BASE_URL", "BACKEND_URL"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with `success: false` or an unexpected payload.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Validation(#[from] BankValidationError),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url.trim())?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&api_base_url_from_env())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join("api/")?.join(path)?)
    }

    /// Logs a student in and returns the identity the exam session carries.
    pub async fn student_login(
        &self,
        name: &str,
        roll_number: &str,
    ) -> Result<SessionContext, ClientError> {
        let response = self
            .http
            .post(self.endpoint("student-login")?)
            .json(&serde_json::json!({ "name": name, "rollNumber": roll_number }))
            .send()
            .await?;
        expect_success(response).await?;

        Ok(SessionContext::new(name.trim(), roll_number.trim()))
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("admin-login")?)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        expect_success(response).await
    }

    /// Fetches the question bank. Anything other than a JSON array is rejected.
    pub async fn questions(&self) -> Result<Vec<Question>, ClientError> {
        let response = self.http.get(self.endpoint("questions")?).send().await?;
        let payload: serde_json::Value = read_json(response).await?;
        if !payload.is_array() {
            return Err(ClientError::Rejected(
                "question set is not a list".to_string(),
            ));
        }

        serde_json::from_value(payload).map_err(|e| ClientError::Rejected(e.to_string()))
    }

    /// Validates a question bank file locally, then uploads it.
    /// Returns the number of questions uploaded.
    pub async fn upload_question_bank(
        &self,
        file_name: &str,
        contents: &[u8],
    ) -> Result<usize, ClientError> {
        let raw: serde_json::Value = serde_json::from_slice(contents)
            .map_err(|e| ClientError::Rejected(format!("Failed to parse JSON: {}", e)))?;
        let count = validate_question_bank(&raw)?.len();

        let part = Part::bytes(contents.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("upload-questions")?)
            .multipart(form)
            .send()
            .await?;
        expect_success(response).await?;

        Ok(count)
    }

    pub async fn results(&self) -> Result<Vec<SubmissionRecord>, ClientError> {
        let response = self.http.get(self.endpoint("results")?).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl QuestionSource for ApiClient {
    async fn fetch_question_set(&self) -> Result<Vec<Question>, LoadFailure> {
        self.questions()
            .await
            .map_err(|e| LoadFailure::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SubmissionSink for ApiClient {
    async fn submit_exam(&self, request: &SubmitExamRequest) -> Result<(), SubmissionFailure> {
        let url = self
            .endpoint("submit-exam")
            .map_err(|e| SubmissionFailure::Unreachable(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| SubmissionFailure::Unreachable(e.to_string()))?;

        expect_success(response).await.map_err(|e| match e {
            ClientError::Http(e) => SubmissionFailure::Unreachable(e.to_string()),
            other => SubmissionFailure::Rejected(other.to_string()),
        })
    }
}

/// Reads an `ApiReply` body and turns `success: false` into an error,
/// whatever the status code.
async fn expect_success(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    let reply = response.json::<ApiReply>().await.map_err(|e| {
        if status.is_success() {
            ClientError::Http(e)
        } else {
            ClientError::Rejected(format!("server responded {}", status))
        }
    })?;

    if reply.success {
        Ok(())
    } else {
        Err(ClientError::Rejected(
            reply
                .error
                .unwrap_or_else(|| format!("server responded {}", status)),
        ))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ApiReply>().await {
            Ok(ApiReply {
                error: Some(error), ..
            }) => error,
            _ => format!("server responded {}", status),
        };
        return Err(ClientError::Rejected(message));
    }

    Ok(response.json::<T>().await?)
}
