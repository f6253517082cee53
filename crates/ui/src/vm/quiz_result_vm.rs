use services::{SessionSnapshot, SubmitTrigger, Termination};

#[derive(Clone, Debug, PartialEq)]
pub struct QuizResultVm {
    pub title: &'static str,
    pub status: &'static str,
    /// Present only when the attempt was submitted and the portal returned a score.
    pub score_label: Option<String>,
    pub total_questions: usize,
    pub answered: usize,
    pub correct_answers: usize,
    pub points_label: String,
    pub avg_time_label: String,
}

impl QuizResultVm {
    /// `None` while the session has not terminated.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let termination = snapshot.state.termination()?;
        let stats = &snapshot.stats;

        let (title, status, score) = match termination {
            Termination::Submitted {
                trigger: SubmitTrigger::Completed,
                score,
            } => ("Quiz Results", "All questions answered and submitted.", *score),
            Termination::Submitted {
                trigger: SubmitTrigger::TimeExpired,
                score,
            } => ("Quiz Results", "Time ran out. Your answers were submitted.", *score),
            Termination::Abandoned => (
                "Quiz Abandoned",
                "You left the quiz. Nothing was submitted.",
                None,
            ),
        };

        Some(Self {
            title,
            status,
            score_label: score.map(|score| format!("Score: {}", format_score(score))),
            total_questions: stats.total_questions,
            answered: stats.answered,
            correct_answers: stats.correct_answers,
            points_label: format!("{} / {} points", stats.total_points, stats.max_points),
            avg_time_label: format!(
                "Average Time per Question: {}s",
                stats.avg_time_per_question.round()
            ),
        })
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}
