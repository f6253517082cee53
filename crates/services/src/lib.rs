#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod memory;
pub mod provider;
pub mod quiz_api;
pub mod sessions;
pub mod sink;

pub use quiz_core::Clock;

pub use config::{QuizApiConfig, SessionConfig};
pub use error::{ProviderError, SessionError, SinkError};
pub use memory::{InMemoryQuizProvider, InMemorySubmissionSink, RecordedSubmission};
pub use provider::QuizProvider;
pub use quiz_api::QuizApiClient;
pub use sink::{SubmissionReceipt, SubmissionSink};

pub use sessions::{
    AnswerResult, AnswerStep, FailedSubmission, QuizSession, QuizSessionLoop, RunningSession,
    SessionEvent, SessionHandle, SessionSnapshot, SessionState, SessionStateKind, SubmitTrigger,
    Termination, TickOutcome,
};
