// src/storage/json_file.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};

use super::{ExamStore, StoreError};
use crate::models::{question::Question, submission::SubmissionRecord};

/// Local JSON storage used when Postgres is not configured or unreachable.
///
/// Layout under the data directory:
/// * `uploads/questions.json` - the question bank.
/// * `results.json` - every submission, in arrival order.
pub struct JsonFileStore {
    questions_path: PathBuf,
    results_path: PathBuf,
    // Serializes read-modify-write cycles on both files.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the storage directory.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        let uploads_dir = data_dir.join("uploads");
        fs::create_dir_all(&uploads_dir).await?;

        Ok(Self {
            questions_path: uploads_dir.join("questions.json"),
            results_path: data_dir.join("results.json"),
            write_lock: Mutex::new(()),
        })
    }

    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }
}

#[async_trait]
impl ExamStore for JsonFileStore {
    async fn fetch_questions(&self) -> Result<Vec<Question>, StoreError> {
        Ok(read_json_or_default(&self.questions_path).await)
    }

    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        write_json(&self.questions_path, questions).await
    }

    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        // A results file that cannot be parsed must not be overwritten.
        let mut existing: Vec<SubmissionRecord> = read_json_strict(&self.results_path).await?;

        if let Some(session_id) = &record.session_id {
            if existing
                .iter()
                .any(|stored| stored.session_id.as_ref() == Some(session_id))
            {
                return Ok(false);
            }
        }

        existing.push(record.clone());
        write_json(&self.results_path, &existing).await?;
        Ok(true)
    }

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        Ok(read_json_or_default(&self.results_path).await)
    }
}

/// Reads a JSON file, treating a missing, blank or unreadable file as empty.
async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            tracing::error!("Error reading {}: {}", path.display(), e);
            return T::default();
        }
    };

    if raw.trim().is_empty() {
        return T::default();
    }

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::error!("Error parsing {}: {}", path.display(), e);
        T::default()
    })
}

/// Reads a JSON file before rewriting it. Only a missing or blank file reads
/// as empty; any other failure is returned.
async fn read_json_strict<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };

    if raw.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&raw).map_err(|e| {
        tracing::error!("Refusing to rewrite {}: {}", path.display(), e);
        StoreError::from(e)
    })
}

/// Writes pretty JSON through a sibling temp file so readers never see a
/// half-written document.
async fn write_json<T: Serialize + ?Sized>(path: &Path, payload: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(payload)?;
    let tmp_path = path.with_extension("json.tmp");

    fs::write(&tmp_path, body).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}
