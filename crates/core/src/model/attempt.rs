use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{AttemptId, QuestionId};
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has no questions")]
    NoQuestions,

    #[error("time limit must be greater than zero seconds")]
    ZeroTimeLimit,

    #[error("question {id} appears more than once")]
    DuplicateQuestion { id: QuestionId },
}

/// One student's timed run through a quiz: the ordered question set and the
/// total time budget. Fixed once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    id: AttemptId,
    questions: Vec<Question>,
    time_limit_secs: u32,
}

impl Attempt {
    /// # Errors
    ///
    /// Returns `AttemptError::NoQuestions` for an empty question list,
    /// `AttemptError::ZeroTimeLimit` for a zero budget and
    /// `AttemptError::DuplicateQuestion` when a question id repeats.
    pub fn new(
        id: AttemptId,
        questions: Vec<Question>,
        time_limit_secs: u32,
    ) -> Result<Self, AttemptError> {
        if questions.is_empty() {
            return Err(AttemptError::NoQuestions);
        }
        if time_limit_secs == 0 {
            return Err(AttemptError::ZeroTimeLimit);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(AttemptError::DuplicateQuestion {
                    id: question.id().clone(),
                });
            }
        }

        Ok(Self {
            id,
            questions,
            time_limit_secs,
        })
    }

    #[must_use]
    pub fn id(&self) -> &AttemptId {
        &self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    /// Sum of all question point values.
    #[must_use]
    pub fn max_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points())).sum()
    }
}
