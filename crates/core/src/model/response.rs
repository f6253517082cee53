use serde::{Deserialize, Serialize};

use crate::model::ids::{AttemptId, QuestionId, ResponseId};
use crate::model::question::Question;

pub const CORRECT_FEEDBACK: &str = "Correct!";

/// Feedback shown for `answer` to `question`.
#[must_use]
pub fn feedback_for(question: &Question, answer: &str) -> String {
    if question.is_correct(answer) {
        CORRECT_FEEDBACK.to_string()
    } else {
        format!(
            "Incorrect. The correct answer is \"{}\"",
            question.correct_answer()
        )
    }
}

/// The graded record of one answered question.
///
/// Serialized with the field names the quiz service expects on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "response_id")]
    id: ResponseId,
    attempt_id: AttemptId,
    question_id: QuestionId,
    student_answer: String,
    is_correct: bool,
    #[serde(rename = "time_taken")]
    time_taken_secs: u32,
    points_earned: u32,
    feedback: String,
}

impl Response {
    /// Grade `answer` against `question`.
    #[must_use]
    pub fn grade(
        id: ResponseId,
        attempt_id: &AttemptId,
        question: &Question,
        answer: impl Into<String>,
        time_taken_secs: u32,
    ) -> Self {
        let student_answer = answer.into();
        Self {
            id,
            attempt_id: attempt_id.clone(),
            question_id: question.id().clone(),
            is_correct: question.is_correct(&student_answer),
            points_earned: question.points_for(&student_answer),
            feedback: feedback_for(question, &student_answer),
            student_answer,
            time_taken_secs,
        }
    }

    #[must_use]
    pub fn id(&self) -> ResponseId {
        self.id
    }

    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn student_answer(&self) -> &str {
        &self.student_answer
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}
