use std::sync::Arc;

use tracing::debug;

use quiz_core::model::{Attempt, AttemptId, Response};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::provider::QuizProvider;
use crate::sink::SubmissionSink;
use crate::Clock;
use super::runner::{self, RunningSession};
use super::service::{AnswerStep, QuizSession, TickOutcome};
use super::state::{SessionState, SubmissionRequest, Termination};

/// Result of submitting one answer through the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    /// The graded response, when this call recorded one.
    pub response: Option<Response>,
    pub is_complete: bool,
    pub score: Option<f64>,
    /// Sink failure message when the final submission did not go through.
    pub submission_error: Option<String>,
}

/// Orchestrates session start and sink delivery around [`QuizSession`].
#[derive(Clone)]
pub struct QuizSessionLoop {
    clock: Clock,
    provider: Arc<dyn QuizProvider>,
    sink: Arc<dyn SubmissionSink>,
    config: SessionConfig,
}

impl QuizSessionLoop {
    #[must_use]
    pub fn new(
        clock: Clock,
        provider: Arc<dyn QuizProvider>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            clock,
            provider,
            sink,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Load the attempt from the provider and start a session for it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Provider` when the attempt cannot be loaded.
    pub async fn start(&self, attempt_id: &AttemptId) -> Result<QuizSession, SessionError> {
        let attempt = self.provider.load_attempt(attempt_id).await?;
        Ok(self.start_with(attempt))
    }

    /// Start a session for an attempt the caller already holds.
    #[must_use]
    pub fn start_with(&self, attempt: Attempt) -> QuizSession {
        QuizSession::start(attempt, self.clock.clone())
            .with_low_time_threshold(self.config.low_time_threshold_secs)
    }

    /// Advance the clock one second, submitting if time ran out.
    ///
    /// # Errors
    ///
    /// Returns the fatal `SessionError::MissingQuestion` from the engine.
    pub async fn tick(&self, session: &mut QuizSession) -> Result<TickOutcome, SessionError> {
        let outcome = session.tick()?;
        if let TickOutcome::Expired(request) = &outcome {
            self.deliver(session, request).await?;
        }
        Ok(outcome)
    }

    /// Submit the pending answer, delivering the response list when it was the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the engine rejects the call. Sink failures
    /// are reported in `AnswerResult::submission_error`, not as `Err`.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
    ) -> Result<AnswerResult, SessionError> {
        let recorded_before = session.responses().len();
        match session.submit_answer()? {
            AnswerStep::Advanced { response, .. } => Ok(AnswerResult {
                response: Some(response),
                is_complete: false,
                score: None,
                submission_error: None,
            }),
            AnswerStep::Submit(request) => {
                // A resubmission records nothing new.
                let response = (request.responses.len() > recorded_before)
                    .then(|| request.responses.last().cloned())
                    .flatten();
                self.deliver(session, &request).await?;
                Ok(Self::result_of(session, response))
            }
        }
    }

    /// Resubmit after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToRetry` when nothing has failed.
    pub async fn retry_submission(
        &self,
        session: &mut QuizSession,
    ) -> Result<AnswerResult, SessionError> {
        let request = session.retry_submission()?;
        self.deliver(session, &request).await?;
        Ok(Self::result_of(session, None))
    }

    /// Hand the request to the sink and feed the result back to the engine.
    pub(crate) async fn deliver(
        &self,
        session: &mut QuizSession,
        request: &SubmissionRequest,
    ) -> Result<(), SessionError> {
        debug!(
            attempt_id = %request.attempt_id,
            responses = request.responses.len(),
            trigger = ?request.trigger,
            "delivering submission"
        );
        let result = self
            .sink
            .submit(&request.attempt_id, &request.responses)
            .await;
        session.complete_submission(result)
    }

    /// Move `session` onto its own task, ticking on the configured period.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` unless the session is `Active`.
    pub fn spawn(&self, session: QuizSession) -> Result<RunningSession, SessionError> {
        runner::spawn(session, Arc::clone(&self.sink), self.config.tick_period)
    }

    /// Load the attempt and run it on its own task.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Provider` when the attempt cannot be loaded.
    pub async fn launch(&self, attempt_id: &AttemptId) -> Result<RunningSession, SessionError> {
        let session = self.start(attempt_id).await?;
        self.spawn(session)
    }

    fn result_of(session: &QuizSession, response: Option<Response>) -> AnswerResult {
        let score = match session.state() {
            SessionState::Terminated(Termination::Submitted { score, .. }) => *score,
            _ => None,
        };
        AnswerResult {
            response,
            is_complete: session.is_terminated(),
            score,
            submission_error: session.last_error().map(str::to_string),
        }
    }
}
