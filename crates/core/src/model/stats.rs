use serde::Serialize;

use crate::model::question::Question;
use crate::model::response::Response;

/// Aggregate figures for a response list, as shown on the result screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseStats {
    pub total_questions: usize,
    pub answered: usize,
    pub correct_answers: usize,
    pub total_points: u64,
    pub max_points: u64,
    /// Mean of `time_taken` over answered questions; zero when none were answered.
    pub avg_time_per_question: f64,
    /// `total_points / max_points * 100`; zero when the quiz carries no points.
    pub score_percent: f64,
}

impl ResponseStats {
    #[must_use]
    pub fn from_responses(questions: &[Question], responses: &[Response]) -> Self {
        let max_points: u64 = questions.iter().map(|q| u64::from(q.points())).sum();
        let total_points: u64 = responses
            .iter()
            .map(|r| u64::from(r.points_earned()))
            .sum();
        let correct_answers = responses.iter().filter(|r| r.is_correct()).count();
        let total_time: u64 = responses
            .iter()
            .map(|r| u64::from(r.time_taken_secs()))
            .sum();

        let avg_time_per_question = if responses.is_empty() {
            0.0
        } else {
            total_time as f64 / responses.len() as f64
        };
        let score_percent = if max_points == 0 {
            0.0
        } else {
            total_points as f64 / max_points as f64 * 100.0
        };

        Self {
            total_questions: questions.len(),
            answered: responses.len(),
            correct_answers,
            total_points,
            max_points,
            avg_time_per_question,
            score_percent,
        }
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total_questions.saturating_sub(self.answered)
    }
}
