//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AttemptError, AttemptId, QuestionId};

use crate::sessions::SessionStateKind;

/// Errors emitted by a `QuizProvider`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("attempt {0} not found")]
    NotFound(AttemptId),
    #[error("quiz session is {status}, not active")]
    NotActive { status: String },
    #[error("quiz service rejected the request: {0}")]
    Rejected(String),
    #[error("quiz request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    InvalidPayload(#[from] quiz_core::Error),
    #[error("quiz provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by a `SubmissionSink`.
///
/// The engine never inspects these; it keeps the display text as the
/// session's last submission error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("submission sink unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by the quiz session engine and its drivers.
///
/// Every variant except `MissingQuestion` describes a rejected call that left
/// the session unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has not been initialized")]
    NotInitialized,
    #[error("session has already been started")]
    AlreadyStarted,
    #[error("session is {state}, not active")]
    NotActive { state: SessionStateKind },
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("no submission is in progress")]
    NotSubmitting,
    #[error("no answer selected")]
    NoAnswerSelected,
    #[error("{option:?} is not an option of the current question")]
    InvalidOption { option: String },
    #[error("question {question_id} has already been answered")]
    AlreadyAnswered { question_id: QuestionId },
    #[error("quiz time has expired")]
    TimeExpired,
    #[error("there is no failed submission to retry")]
    NothingToRetry,
    #[error("no question at cursor index {index}")]
    MissingQuestion { index: usize },
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("session runner has stopped")]
    RunnerStopped,
}

impl SessionError {
    /// True for internal invariant violations that no caller action can fix.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::MissingQuestion { .. })
    }
}
