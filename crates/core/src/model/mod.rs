mod attempt;
mod ids;
mod question;
mod response;
mod stats;

pub use ids::{AttemptId, ParseIdError, QuestionId, ResponseId};

pub use attempt::{Attempt, AttemptError};
pub use question::{Difficulty, Question, QuestionDraft, QuestionError, QuestionKind, option_key};
pub use response::{CORRECT_FEEDBACK, Response, feedback_for};
pub use stats::ResponseStats;
