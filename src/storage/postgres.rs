// src/storage/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, PgPool,
    postgres::PgPoolOptions,
    types::Json,
};

use super::{ExamStore, StoreError};
use crate::models::{
    question::{Question, QuestionOptions},
    submission::{AnswerMap, SubmissionRecord},
};

/// Row shape of the `questions` table.
#[derive(FromRow)]
struct QuestionRow {
    question: String,
    options: Option<Json<QuestionOptions>>,
    answer: String,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            text: row.question,
            options: row.options.map(|options| options.0),
            correct_answer: row.answer,
        }
    }
}

/// Row shape of the `submissions` table.
#[derive(FromRow)]
struct SubmissionRow {
    name: String,
    roll_number: String,
    answers: Json<AnswerMap>,
    score: i64,
    session_id: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl From<SubmissionRow> for SubmissionRecord {
    fn from(row: SubmissionRow) -> Self {
        SubmissionRecord {
            name: row.name,
            roll_number: row.roll_number,
            answers: row.answers.0,
            score: row.score,
            session_id: row.session_id,
            submitted_at: row.submitted_at,
        }
    }
}

/// Postgres-backed store. Options and answers live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Cheap round trip used by the availability probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ExamStore for PgStore {
    async fn fetch_questions(&self) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT question, options, answer
            FROM questions
            ORDER BY position, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions: {:?}", e);
            e
        })?;

        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;

        for (position, question) in questions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO questions (position, question, options, answer)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(position as i32)
            .bind(&question.text)
            .bind(question.options.clone().map(Json))
            .bind(&question.correct_answer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!("Replaced question bank with {} questions", questions.len());
        Ok(())
    }

    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<bool, StoreError> {
        // A repeated session id hits the unique index and inserts nothing.
        let result = sqlx::query(
            r#"
            INSERT INTO submissions (name, roll_number, answers, score, session_id, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(&record.name)
        .bind(&record.roll_number)
        .bind(Json(record.answers.clone()))
        .bind(record.score)
        .bind(&record.session_id)
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert submission: {:?}", e);
            e
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT name, roll_number, answers, score, session_id, submitted_at
            FROM submissions
            ORDER BY submitted_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SubmissionRecord::from).collect())
    }
}
