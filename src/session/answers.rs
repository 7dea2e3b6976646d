// src/session/answers.rs

use crate::models::submission::AnswerMap;

/// Key under which the answer to the question at `index` (0-based) is stored.
pub fn answer_key(index: usize) -> String {
    format!("Q{}", index + 1)
}

/// Current answer text per question position.
///
/// Writes overwrite: the store has no notion of which input channel wrote a
/// value, so the last write wins. Channels that edit incrementally (virtual
/// keys) compute the full string first and write that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: AnswerMap,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, index: usize, value: impl Into<String>) {
        self.answers.insert(answer_key(index), value.into());
    }

    /// Empty when the question was never answered.
    pub fn get_answer(&self, index: usize) -> &str {
        self.answers
            .get(&answer_key(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn as_map(&self) -> &AnswerMap {
        &self.answers
    }
}
