// tests/session_tests.rs

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use exam_portal::{
    input::AnswerInputChannel,
    models::{
        question::{Question, QuestionOptions},
        submission::SubmitExamRequest,
    },
    session::{
        AnswerStore, Countdown, CountdownState, ExamSession, LoadFailure, QuestionSource,
        SessionConfig, SessionContext, SubmissionFailure, SubmissionSink, SubmitOutcome,
        SubmitTrigger, Tick, format_clock, scoring,
    },
};

struct StaticSource(Result<Vec<Question>, LoadFailure>);

#[async_trait]
impl QuestionSource for StaticSource {
    async fn fetch_question_set(&self) -> Result<Vec<Question>, LoadFailure> {
        self.0.clone()
    }
}

/// Records every submission it receives; optionally fails them all.
#[derive(Default)]
struct RecordingSink {
    requests: Mutex<Vec<SubmitExamRequest>>,
    failure: Option<SubmissionFailure>,
}

impl RecordingSink {
    fn failing(failure: SubmissionFailure) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    fn requests(&self) -> Vec<SubmitExamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn submit_exam(&self, request: &SubmitExamRequest) -> Result<(), SubmissionFailure> {
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

fn options(a: &str, b: &str, c: &str, d: &str) -> QuestionOptions {
    QuestionOptions {
        a: a.to_string(),
        b: b.to_string(),
        c: c.to_string(),
        d: d.to_string(),
    }
}

fn two_plus_two() -> Question {
    Question::multiple_choice("2+2=?", options("3", "4", "5", "6"), "b")
}

fn three_questions() -> Vec<Question> {
    vec![
        two_plus_two(),
        Question::multiple_choice("Largest planet?", options("Mars", "Venus", "Jupiter", "Earth"), "c"),
        Question::free_text("Chemical symbol for gold?", "Au"),
    ]
}

fn context() -> SessionContext {
    SessionContext::new("Asha", "21CS042")
}

async fn start_with(
    questions: Vec<Question>,
    sink: Arc<RecordingSink>,
    config: SessionConfig,
) -> Arc<ExamSession> {
    ExamSession::start(context(), &StaticSource(Ok(questions)), sink, config)
        .await
        .expect("session should start")
}

async fn start(questions: Vec<Question>, sink: Arc<RecordingSink>) -> Arc<ExamSession> {
    start_with(questions, sink, SessionConfig::default()).await
}

#[tokio::test]
async fn correct_answer_scores_one() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(vec![two_plus_two()], sink.clone()).await;

    session.set_answer(0, "b");
    let outcome = session.submit(SubmitTrigger::Manual).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            score: 1,
            total: 1,
            trigger: SubmitTrigger::Manual
        }
    );
    assert_eq!(sink.requests()[0].score, 1);
}

#[tokio::test]
async fn answers_match_case_insensitively() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(vec![two_plus_two()], sink.clone()).await;

    session.set_answer(0, "B");
    session.submit(SubmitTrigger::Manual).await;

    assert_eq!(sink.requests()[0].score, 1);
}

#[tokio::test]
async fn unanswered_exam_scores_zero() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(vec![two_plus_two()], sink.clone()).await;

    let outcome = session.submit(SubmitTrigger::Manual).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            score: 0,
            total: 1,
            trigger: SubmitTrigger::Manual
        }
    );
    assert!(sink.requests()[0].answers.is_empty());
}

#[test]
fn score_counts_only_matching_positions() {
    let mut questions = three_questions();
    questions.push(Question::multiple_choice("Blank key", options("1", "2", "3", "4"), "  "));

    let mut answers = AnswerStore::new();
    answers.set_answer(0, "  B ");
    answers.set_answer(1, "a");
    answers.set_answer(2, "au");
    answers.set_answer(3, "");
    // Answers beyond the question set are never scored.
    answers.set_answer(7, "b");

    assert_eq!(scoring::score(&questions, &answers), 2);
    assert_eq!(scoring::score(&questions, &AnswerStore::new()), 0);
    assert!(!scoring::is_correct("", ""));
}

#[tokio::test]
async fn empty_question_set_reports_no_questions() {
    let sink = Arc::new(RecordingSink::default());

    let result = ExamSession::start(
        context(),
        &StaticSource(Ok(Vec::new())),
        sink.clone(),
        SessionConfig::default(),
    )
    .await;

    let failure = result.err().expect("an empty set must not start a session");
    assert_eq!(failure, LoadFailure::NoQuestionsAvailable);
    assert_eq!(failure.status_text(), "No questions available. Contact admin.");
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn unreachable_question_source_is_a_load_failure() {
    let sink = Arc::new(RecordingSink::default());
    let source = StaticSource(Err(LoadFailure::Unavailable("connection refused".to_string())));

    let failure = ExamSession::start(context(), &source, sink, SessionConfig::default())
        .await
        .err()
        .expect("load should fail");

    assert!(matches!(failure, LoadFailure::Unavailable(_)));
    assert_eq!(failure.status_text(), "Failed to load questions.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_triggers_submit_exactly_once() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(three_questions(), sink.clone()).await;
    session.set_answer(0, "b");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = session.clone();
            let trigger = if i == 0 {
                SubmitTrigger::Auto
            } else {
                SubmitTrigger::Manual
            };
            tokio::spawn(async move { session.submit(trigger).await })
        })
        .collect();

    let mut submitted = 0;
    let mut ignored = 0;
    for handle in handles {
        match handle.await.unwrap() {
            SubmitOutcome::Submitted { .. } => submitted += 1,
            SubmitOutcome::AlreadySubmitted => ignored += 1,
            SubmitOutcome::Failed(failure) => panic!("unexpected failure: {failure}"),
        }
    }

    assert_eq!(submitted, 1);
    assert_eq!(ignored, 7);
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test]
async fn expiry_racing_a_manual_click_submits_once() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(vec![two_plus_two()], sink.clone()).await;

    let (auto, manual) = tokio::join!(
        session.submit(SubmitTrigger::Auto),
        session.submit(SubmitTrigger::Manual)
    );

    assert!(matches!(
        auto,
        SubmitOutcome::Submitted {
            trigger: SubmitTrigger::Auto,
            ..
        }
    ));
    assert_eq!(manual, SubmitOutcome::AlreadySubmitted);
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test]
async fn second_submit_is_a_no_op() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(vec![two_plus_two()], sink.clone()).await;

    session.submit(SubmitTrigger::Manual).await;
    let status = session.status_text();
    let again = session.submit(SubmitTrigger::Manual).await;

    assert_eq!(again, SubmitOutcome::AlreadySubmitted);
    assert_eq!(again.status_text(), None);
    assert_eq!(session.status_text(), status);
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test]
async fn failed_submission_keeps_the_latch() {
    let sink = Arc::new(RecordingSink::failing(SubmissionFailure::Rejected(
        "Unable to store submission. Please try again.".to_string(),
    )));
    let session = start(vec![two_plus_two()], sink.clone()).await;

    let outcome = session.submit(SubmitTrigger::Manual).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(SubmissionFailure::Rejected(_))));
    assert_eq!(session.status_text().as_deref(), Some("Failed to submit exam."));
    assert!(session.is_submitted());

    assert_eq!(
        session.submit(SubmitTrigger::Manual).await,
        SubmitOutcome::AlreadySubmitted
    );
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test]
async fn unreachable_sink_reports_server_error() {
    let sink = Arc::new(RecordingSink::failing(SubmissionFailure::Unreachable(
        "connection reset".to_string(),
    )));
    let session = start(vec![two_plus_two()], sink).await;

    session.submit(SubmitTrigger::Auto).await;

    assert_eq!(
        session.status_text().as_deref(),
        Some("Server error while submitting exam.")
    );
}

#[tokio::test]
async fn status_text_distinguishes_manual_and_auto() {
    let manual = start(vec![two_plus_two()], Arc::new(RecordingSink::default())).await;
    manual.set_answer(0, "b");
    manual.submit(SubmitTrigger::Manual).await;
    assert_eq!(
        manual.status_text().as_deref(),
        Some("Exam submitted successfully! Score: 1/1")
    );

    let auto = start(three_questions(), Arc::new(RecordingSink::default())).await;
    auto.submit(SubmitTrigger::Auto).await;
    assert_eq!(
        auto.status_text().as_deref(),
        Some("Time over. Exam auto-submitted. Score: 0/3")
    );
}

#[tokio::test]
async fn submission_carries_identity_answers_and_session_id() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(three_questions(), sink.clone()).await;

    session.set_answer(0, "b");
    session.set_answer(2, "AU");
    session.submit(SubmitTrigger::Manual).await;

    let request = &sink.requests()[0];
    assert_eq!(request.name, "Asha");
    assert_eq!(request.roll_number, "21CS042");
    assert_eq!(request.score, 2);
    assert_eq!(request.answers.get("Q1").map(String::as_str), Some("b"));
    assert_eq!(request.answers.get("Q3").map(String::as_str), Some("AU"));
    assert!(!request.answers.contains_key("Q2"));
    assert_eq!(request.session_id, Some(session.id().to_string()));
}

#[tokio::test]
async fn answers_are_frozen_after_submission() {
    let sink = Arc::new(RecordingSink::default());
    let session = start(three_questions(), sink).await;

    assert!(session.set_answer(0, "b"));
    session.submit(SubmitTrigger::Manual).await;

    assert!(!session.set_answer(0, "c"));
    assert!(!session.activate_key("D"));
    assert_eq!(session.get_answer(0), "b");
}

#[tokio::test]
async fn answers_outside_the_question_set_are_ignored() {
    let session = start(three_questions(), Arc::new(RecordingSink::default())).await;

    assert!(!session.set_answer(3, "a"));
    assert!(session.answers().is_empty());
    assert_eq!(session.get_answer(3), "");
}

#[tokio::test]
async fn navigation_stays_within_bounds() {
    let session = start(three_questions(), Arc::new(RecordingSink::default())).await;

    assert_eq!(session.cursor(), 0);
    assert!(!session.previous());
    assert_eq!(session.cursor(), 0);

    assert!(!session.go_to(3));
    assert!(!session.go_to(usize::MAX));
    assert_eq!(session.cursor(), 0);

    assert!(session.go_to(2));
    assert_eq!(session.current_question().text, "Chemical symbol for gold?");
    assert!(!session.next());
    assert_eq!(session.cursor(), 2);

    assert!(session.previous());
    assert_eq!(session.cursor(), 1);
}

#[tokio::test]
async fn navigation_does_not_touch_answers_or_timer() {
    let session = start(three_questions(), Arc::new(RecordingSink::default())).await;
    session.set_answer(0, "b");
    let remaining = session.time_remaining();

    session.go_to(2);
    session.go_to(0);

    assert_eq!(session.get_answer(0), "b");
    assert_eq!(session.time_remaining(), remaining);
}

#[tokio::test]
async fn last_write_wins_across_input_channels() {
    let session = start(three_questions(), Arc::new(RecordingSink::default())).await;

    // Typed answer, then gesture keys editing the same slot.
    session.set_answer(0, "a");
    assert!(session.activate_key("B"));
    assert_eq!(session.get_answer(0), "aB");

    assert!(session.activate_key("SPACE"));
    assert_eq!(session.get_answer(0), "aB ");

    assert!(session.activate_key("BACKSPACE"));
    assert!(session.activate_key("BACKSPACE"));
    assert_eq!(session.get_answer(0), "a");

    // A later keyboard write replaces whatever the keys produced.
    session.set_answer(0, "c");
    assert_eq!(session.get_answer(0), "c");

    assert!(session.activate_key("CLEAR"));
    assert_eq!(session.get_answer(0), "");

    assert!(!session.activate_key("NOT-A-KEY"));
}

#[tokio::test]
async fn keys_edit_the_question_under_the_cursor() {
    let session = start(three_questions(), Arc::new(RecordingSink::default())).await;
    session.set_answer(0, "b");

    session.go_to(1);
    session.activate_key("C");

    assert_eq!(session.get_answer(0), "b");
    assert_eq!(session.get_answer(1), "C");
}

#[test]
fn countdown_decreases_to_zero_and_expires_once() {
    let mut countdown = Countdown::new(3);
    assert_eq!(countdown.state(), CountdownState::Running);

    assert_eq!(countdown.tick(), Tick::Running(2));
    assert_eq!(countdown.tick(), Tick::Running(1));
    assert_eq!(countdown.tick(), Tick::Expired);
    assert_eq!(countdown.state(), CountdownState::Expired);

    for _ in 0..5 {
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.remaining(), 0);
    }

    countdown.stop();
    assert_eq!(countdown.state(), CountdownState::Stopped);
    assert_eq!(countdown.tick(), Tick::Idle);
}

#[test]
fn stopped_countdown_never_ticks() {
    let mut countdown = Countdown::new(10);
    countdown.tick();
    countdown.stop();

    assert_eq!(countdown.tick(), Tick::Idle);
    assert_eq!(countdown.remaining(), 9);
}

#[test]
fn clock_renders_minutes_and_seconds() {
    assert_eq!(format_clock(1800), "30:00");
    assert_eq!(format_clock(65), "01:05");
    assert_eq!(format_clock(0), "00:00");
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_auto_submits_once() {
    let sink = Arc::new(RecordingSink::default());
    let config = SessionConfig {
        duration_secs: 3,
        tick: Duration::from_secs(1),
    };
    let session = start_with(vec![two_plus_two()], sink.clone(), config).await;
    session.set_answer(0, "b");
    assert_eq!(session.clock(), "00:03");

    session.spawn_countdown().await.unwrap();

    assert_eq!(session.time_remaining(), 0);
    assert_eq!(session.countdown_state(), CountdownState::Stopped);
    assert_eq!(
        session.status_text().as_deref(),
        Some("Time over. Exam auto-submitted. Score: 1/1")
    );

    assert_eq!(
        session.submit(SubmitTrigger::Manual).await,
        SubmitOutcome::AlreadySubmitted
    );
    assert_eq!(sink.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_cancels_the_countdown() {
    let sink = Arc::new(RecordingSink::default());
    let config = SessionConfig {
        duration_secs: 100,
        tick: Duration::from_secs(1),
    };
    let session = start_with(three_questions(), sink.clone(), config).await;
    let countdown = session.spawn_countdown();

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(session.time_remaining(), 95);

    session.submit(SubmitTrigger::Manual).await;
    countdown.await.unwrap();
    assert_eq!(session.countdown_state(), CountdownState::Stopped);

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(session.time_remaining(), 95);
    assert_eq!(sink.requests().len(), 1);
}
