use std::fmt;

use quiz_core::model::{AttemptId, Response};

/// What started a hand-off to the submission sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitTrigger {
    /// The last question was answered.
    Completed,
    /// The session clock reached zero.
    TimeExpired,
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    Submitted {
        trigger: SubmitTrigger,
        score: Option<f64>,
    },
    Abandoned,
}

/// Lifecycle of one quiz session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Active,
    Submitting { trigger: SubmitTrigger },
    Terminated(Termination),
}

impl SessionState {
    #[must_use]
    pub fn kind(&self) -> SessionStateKind {
        match self {
            SessionState::Loading => SessionStateKind::Loading,
            SessionState::Active => SessionStateKind::Active,
            SessionState::Submitting { .. } => SessionStateKind::Submitting,
            SessionState::Terminated(_) => SessionStateKind::Terminated,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, SessionState::Submitting { .. })
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    #[must_use]
    pub fn termination(&self) -> Option<&Termination> {
        match self {
            SessionState::Terminated(termination) => Some(termination),
            _ => None,
        }
    }
}

/// Payload-free view of `SessionState`, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStateKind {
    Loading,
    Active,
    Submitting,
    Terminated,
}

impl fmt::Display for SessionStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStateKind::Loading => "loading",
            SessionStateKind::Active => "active",
            SessionStateKind::Submitting => "submitting",
            SessionStateKind::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

/// A submission that the sink reported as failed, kept so it can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSubmission {
    pub trigger: SubmitTrigger,
    pub message: String,
}

/// The full response list handed to the submission sink.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub attempt_id: AttemptId,
    pub trigger: SubmitTrigger,
    pub responses: Vec<Response>,
}
