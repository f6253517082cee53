use async_trait::async_trait;

use quiz_core::model::{Attempt, AttemptId};

use crate::error::ProviderError;

/// Source of quiz attempts: the question set and time budget for one attempt.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// Load the attempt with its questions in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotFound` for an unknown attempt, or other
    /// provider errors when the attempt cannot be loaded or is not active.
    async fn load_attempt(&self, attempt_id: &AttemptId) -> Result<Attempt, ProviderError>;
}
