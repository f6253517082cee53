use quiz_core::model::{AttemptId, Question, ResponseStats};

use super::state::{FailedSubmission, SessionState, SessionStateKind};

/// Everything a presentation layer reads from a quiz session, captured at one
/// instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub attempt_id: AttemptId,
    pub state: SessionState,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub time_remaining_secs: u32,
    pub question_elapsed_secs: u32,
    pub pending_answer: Option<String>,
    pub last_error: Option<String>,
    /// Set while a failed submission waits to be retried.
    pub failed_submission: Option<FailedSubmission>,
    pub time_running_low: bool,
    pub answered: usize,
    pub stats: ResponseStats,
}

impl SessionSnapshot {
    #[must_use]
    pub fn kind(&self) -> SessionStateKind {
        self.state.kind()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// An answer can be submitted: active, something selected, time left.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.state.is_active() && self.pending_answer.is_some() && !self.time_expired()
    }

    /// The clock has run out; only a retry of the expiry submission remains.
    #[must_use]
    pub fn time_expired(&self) -> bool {
        self.total_questions > 0 && self.time_remaining_secs == 0
    }
}
