// src/session/scoring.rs

use super::answers::AnswerStore;
use crate::models::question::Question;

/// Canonical form answers are compared in.
pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Whether `given` matches the expected answer. A blank key matches nothing.
pub fn is_correct(correct_answer: &str, given: &str) -> bool {
    let correct = normalize(correct_answer);
    !correct.is_empty() && normalize(given) == correct
}

/// Number of questions whose stored answer matches the answer key.
pub fn score(questions: &[Question], answers: &AnswerStore) -> u32 {
    questions
        .iter()
        .enumerate()
        .filter(|(index, question)| is_correct(&question.correct_answer, answers.get_answer(*index)))
        .count() as u32
}
