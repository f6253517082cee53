use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quiz_core::model::{Attempt, AttemptId, Response};

use crate::error::{ProviderError, SinkError};
use crate::provider::QuizProvider;
use crate::sink::{SubmissionReceipt, SubmissionSink};

/// Simple in-memory quiz provider for tests and offline demos.
#[derive(Clone, Default)]
pub struct InMemoryQuizProvider {
    attempts: Arc<Mutex<HashMap<AttemptId, Attempt>>>,
}

impl InMemoryQuizProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an attempt.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the store lock is poisoned.
    pub fn insert(&self, attempt: Attempt) -> Result<(), ProviderError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        guard.insert(attempt.id().clone(), attempt);
        Ok(())
    }
}

#[async_trait]
impl QuizProvider for InMemoryQuizProvider {
    async fn load_attempt(&self, attempt_id: &AttemptId) -> Result<Attempt, ProviderError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        guard
            .get(attempt_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(attempt_id.clone()))
    }
}

/// One call observed by [`InMemorySubmissionSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSubmission {
    pub attempt_id: AttemptId,
    pub responses: Vec<Response>,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
enum Scripted {
    Fail(String),
    Succeed(Option<f64>),
}

#[derive(Default)]
struct SinkState {
    script: VecDeque<Scripted>,
    calls: Vec<RecordedSubmission>,
}

/// Submission sink that records every call and replays scripted outcomes.
///
/// With nothing scripted, a submission succeeds and scores the sum of the
/// points earned.
#[derive(Clone, Default)]
pub struct InMemorySubmissionSink {
    state: Arc<Mutex<SinkState>>,
}

impl InMemorySubmissionSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next unscripted call fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Unavailable` if the store lock is poisoned.
    pub fn fail_next(&self, message: impl Into<String>) -> Result<(), SinkError> {
        self.push(Scripted::Fail(message.into()))
    }

    /// Make the next unscripted call succeed with `score`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Unavailable` if the store lock is poisoned.
    pub fn succeed_next(&self, score: Option<f64>) -> Result<(), SinkError> {
        self.push(Scripted::Succeed(score))
    }

    fn push(&self, outcome: Scripted) -> Result<(), SinkError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        guard.script.push_back(outcome);
        Ok(())
    }

    /// Every call received so far, in order.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Unavailable` if the store lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<RecordedSubmission>, SinkError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        Ok(guard.calls.clone())
    }

    /// # Errors
    ///
    /// Returns `SinkError::Unavailable` if the store lock is poisoned.
    pub fn submission_count(&self) -> Result<usize, SinkError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        Ok(guard.calls.len())
    }
}

#[async_trait]
impl SubmissionSink for InMemorySubmissionSink {
    async fn submit(
        &self,
        attempt_id: &AttemptId,
        responses: &[Response],
    ) -> Result<SubmissionReceipt, SinkError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        let outcome = guard.script.pop_front();
        let accepted = !matches!(outcome, Some(Scripted::Fail(_)));
        guard.calls.push(RecordedSubmission {
            attempt_id: attempt_id.clone(),
            responses: responses.to_vec(),
            accepted,
        });

        match outcome {
            Some(Scripted::Fail(message)) => Err(SinkError::Rejected(message)),
            Some(Scripted::Succeed(score)) => Ok(SubmissionReceipt { score }),
            None => {
                let points: u64 = responses
                    .iter()
                    .map(|r| u64::from(r.points_earned()))
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                let score = points as f64;
                Ok(SubmissionReceipt::scored(score))
            }
        }
    }
}
