mod events;
mod runner;
mod service;
mod snapshot;
mod state;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use events::SessionEvent;
pub use runner::{RunningSession, SessionHandle};
pub use service::{AnswerStep, DEFAULT_LOW_TIME_THRESHOLD_SECS, QuizSession, TickOutcome};
pub use snapshot::SessionSnapshot;
pub use state::{
    FailedSubmission, SessionState, SessionStateKind, SubmissionRequest, SubmitTrigger,
    Termination,
};
pub use workflow::{AnswerResult, QuizSessionLoop};
