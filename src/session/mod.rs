// src/session/mod.rs

//! The exam session controller: one student's attempt from question load to
//! submission.
//!
//! A session owns an immutable question set, the answer store, the cursor and
//! the countdown. Submission is guarded by a one-way latch, so however many
//! triggers fire (manual clicks, timer expiry) exactly one submission is
//! handed to the [`SubmissionSink`].

pub mod answers;
pub mod countdown;
pub mod error;
pub mod loader;
pub mod scoring;

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    input::{AnswerInputChannel, Key},
    models::{question::Question, submission::SubmitExamRequest},
};

pub use answers::{AnswerStore, answer_key};
pub use countdown::{Countdown, CountdownState, DEFAULT_DURATION_SECS, Tick, format_clock};
pub use error::{LoadFailure, SubmissionFailure};
pub use loader::{QuestionSource, load_question_set};

/// Who is taking the exam. Built once at login and passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub name: String,
    pub roll_number: String,
}

impl SessionContext {
    pub fn new(name: impl Into<String>, roll_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_number: roll_number.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Exam length in seconds.
    pub duration_secs: u32,
    /// Real time per countdown second.
    pub tick: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            tick: Duration::from_secs(1),
        }
    }
}

/// Where finished exams are sent.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit_exam(&self, request: &SubmitExamRequest) -> Result<(), SubmissionFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The student pressed submit.
    Manual,
    /// The countdown reached zero.
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted {
        score: u32,
        total: usize,
        trigger: SubmitTrigger,
    },
    /// The one attempt failed. The latch stays set.
    Failed(SubmissionFailure),
    /// The latch was already set; nothing was sent.
    AlreadySubmitted,
}

impl SubmitOutcome {
    pub fn status_text(&self) -> Option<String> {
        match self {
            SubmitOutcome::Submitted {
                score,
                total,
                trigger: SubmitTrigger::Manual,
            } => Some(format!("Exam submitted successfully! Score: {score}/{total}")),
            SubmitOutcome::Submitted {
                score,
                total,
                trigger: SubmitTrigger::Auto,
            } => Some(format!("Time over. Exam auto-submitted. Score: {score}/{total}")),
            SubmitOutcome::Failed(failure) => Some(failure.status_text().to_string()),
            SubmitOutcome::AlreadySubmitted => None,
        }
    }
}

pub struct ExamSession {
    id: Uuid,
    context: SessionContext,
    questions: Vec<Question>,
    answers: Mutex<AnswerStore>,
    cursor: AtomicUsize,
    countdown: Mutex<Countdown>,
    tick: Duration,
    // Submission latch. Only ever goes false -> true, under the answers lock.
    submitted: AtomicBool,
    stop: Notify,
    status: Mutex<Option<String>>,
    sink: Arc<dyn SubmissionSink>,
}

impl ExamSession {
    /// Loads the question set and opens a session on it.
    ///
    /// Fails with [`LoadFailure`] when the set cannot be fetched or is empty;
    /// no session (and so no countdown, no submission) exists then.
    pub async fn start(
        context: SessionContext,
        source: &dyn QuestionSource,
        sink: Arc<dyn SubmissionSink>,
        config: SessionConfig,
    ) -> Result<Arc<Self>, LoadFailure> {
        let questions = load_question_set(source).await?;
        let session = Self {
            id: Uuid::new_v4(),
            context,
            questions,
            answers: Mutex::new(AnswerStore::new()),
            cursor: AtomicUsize::new(0),
            countdown: Mutex::new(Countdown::new(config.duration_secs)),
            tick: config.tick,
            submitted: AtomicBool::new(false),
            stop: Notify::new(),
            status: Mutex::new(None),
            sink,
        };
        tracing::info!(
            "Exam session {} started for {} ({})",
            session.id,
            session.context.name,
            session.context.roll_number
        );
        Ok(Arc::new(session))
    }

    /// Session id, sent along with the submission as its idempotency key.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    // ---- answers ----

    /// Overwrites the answer at `index`. Ignored after submission or for an
    /// index outside the question set.
    pub fn set_answer(&self, index: usize, value: impl Into<String>) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        let mut answers = lock(&self.answers);
        if self.is_submitted() {
            return false;
        }
        answers.set_answer(index, value);
        true
    }

    pub fn get_answer(&self, index: usize) -> String {
        lock(&self.answers).get_answer(index).to_string()
    }

    pub fn answers(&self) -> AnswerStore {
        lock(&self.answers).clone()
    }

    // ---- navigation ----

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor()]
    }

    /// Moves the cursor. Out-of-range positions are ignored.
    pub fn go_to(&self, position: usize) -> bool {
        if position >= self.questions.len() {
            return false;
        }
        self.cursor.store(position, Ordering::Release);
        true
    }

    pub fn next(&self) -> bool {
        self.go_to(self.cursor() + 1)
    }

    pub fn previous(&self) -> bool {
        self.cursor()
            .checked_sub(1)
            .is_some_and(|position| self.go_to(position))
    }

    // ---- countdown ----

    pub fn time_remaining(&self) -> u32 {
        lock(&self.countdown).remaining()
    }

    pub fn countdown_state(&self) -> CountdownState {
        lock(&self.countdown).state()
    }

    /// Remaining time as `mm:ss`.
    pub fn clock(&self) -> String {
        format_clock(self.time_remaining())
    }

    /// Runs the countdown on the current tokio runtime.
    pub fn spawn_countdown(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run_countdown())
    }

    /// Ticks once per configured second until the session is submitted or
    /// time runs out, in which case it submits with [`SubmitTrigger::Auto`].
    pub async fn run_countdown(self: Arc<Self>) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.stop.notified() => break,
                _ = interval.tick() => {}
            }

            if self.is_submitted() {
                break;
            }

            let tick = lock(&self.countdown).tick();
            match tick {
                Tick::Running(remaining) => tracing::trace!("{} left", format_clock(remaining)),
                Tick::Expired => {
                    tracing::info!("Exam session {}: time over", self.id);
                    self.submit(SubmitTrigger::Auto).await;
                    break;
                }
                Tick::Idle => break,
            }
        }
    }

    // ---- submission ----

    pub fn is_submitted(&self) -> bool {
        self.submitted.load(Ordering::Acquire)
    }

    /// Latest user-facing status text, if any.
    pub fn status_text(&self) -> Option<String> {
        lock(&self.status).clone()
    }

    /// Scores the answers and sends them, at most once per session.
    ///
    /// The latch is set before anything is awaited, so a concurrent second
    /// trigger returns [`SubmitOutcome::AlreadySubmitted`] without sending or
    /// scoring. A failed attempt keeps the latch set.
    pub async fn submit(&self, trigger: SubmitTrigger) -> SubmitOutcome {
        let answers = {
            let answers = lock(&self.answers);
            if self.submitted.swap(true, Ordering::AcqRel) {
                tracing::debug!("Exam session {}: {:?} submit ignored", self.id, trigger);
                return SubmitOutcome::AlreadySubmitted;
            }
            answers.clone()
        };

        lock(&self.countdown).stop();
        self.stop.notify_one();

        let score = scoring::score(&self.questions, &answers);
        let total = self.questions.len();
        let request = SubmitExamRequest {
            name: self.context.name.clone(),
            roll_number: self.context.roll_number.clone(),
            answers: answers.as_map().clone(),
            score: i64::from(score),
            session_id: Some(self.id.to_string()),
        };

        let outcome = match self.sink.submit_exam(&request).await {
            Ok(()) => {
                tracing::info!(
                    "Exam session {} submitted ({:?}), score {}/{}",
                    self.id,
                    trigger,
                    score,
                    total
                );
                SubmitOutcome::Submitted {
                    score,
                    total,
                    trigger,
                }
            }
            Err(failure) => {
                tracing::error!("Exam session {}: {}", self.id, failure);
                SubmitOutcome::Failed(failure)
            }
        };

        *lock(&self.status) = outcome.status_text();
        outcome
    }
}

/// Keys typed on the virtual or gesture keyboard edit the question under the
/// cursor.
impl AnswerInputChannel for ExamSession {
    fn activate_key(&self, label: &str) -> bool {
        let key = match label.parse::<Key>() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("{}", e);
                return false;
            }
        };

        let index = self.cursor();
        let mut answers = lock(&self.answers);
        if self.is_submitted() {
            return false;
        }
        let next = key.apply(answers.get_answer(index));
        answers.set_answer(index, next);
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
