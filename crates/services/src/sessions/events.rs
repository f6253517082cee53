use super::state::{SubmitTrigger, Termination};

/// Transition notifications emitted by a quiz session, in order.
///
/// `Terminated` is emitted exactly once per attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        total_questions: usize,
        time_limit_secs: u32,
    },
    AnswerSelected {
        index: usize,
        answer: String,
    },
    QuestionAdvanced {
        index: usize,
    },
    /// Fired once, when the clock first drops to the low-time threshold.
    TimeRunningLow {
        remaining_secs: u32,
    },
    SubmissionStarted {
        trigger: SubmitTrigger,
        responses: usize,
    },
    SubmissionFailed {
        trigger: SubmitTrigger,
        message: String,
    },
    Terminated(Termination),
}
