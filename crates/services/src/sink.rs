use async_trait::async_trait;

use quiz_core::model::{AttemptId, Response};

use crate::error::SinkError;

/// What the sink reports back for an accepted submission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubmissionReceipt {
    pub score: Option<f64>,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn scored(score: f64) -> Self {
        Self { score: Some(score) }
    }
}

/// Receiver of a finished attempt's full response list.
///
/// Called at most once per submission attempt; a failed call may be repeated
/// with the same list.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `SinkError` when the submission was not accepted.
    async fn submit(
        &self,
        attempt_id: &AttemptId,
        responses: &[Response],
    ) -> Result<SubmissionReceipt, SinkError>;
}
