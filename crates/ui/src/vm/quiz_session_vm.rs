use quiz_core::model::option_key;
use services::{SessionSnapshot, SessionState, SubmitTrigger};

use super::time_fmt::{format_clock, format_time_spent};

/// The timer turns urgent at or below this many seconds.
pub const URGENT_TIMER_SECS: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

/// Everything the question card renders, derived from one session snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizSessionVm {
    pub header: String,
    pub progress_label: String,
    pub progress_percent: f64,
    pub timer_label: String,
    pub timer_urgent: bool,
    pub time_spent_label: String,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    /// Inputs are locked while a submission is in flight.
    pub is_submitting: bool,
    pub can_submit: bool,
    pub submit_label: &'static str,
    pub error_banner: Option<String>,
    pub low_time_banner: Option<String>,
    /// Time ran out and the expiry submission failed; only a retry is left.
    pub needs_retry: bool,
    pub status_banner: Option<&'static str>,
    /// The question's explanation, offered behind a "Show Hint" button.
    pub hint: Option<String>,
    pub can_show_hint: bool,
}

impl QuizSessionVm {
    /// `None` until the session has a current question.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let question = snapshot.question.as_ref()?;
        let total = snapshot.total_questions.max(1);
        let index = snapshot.current_index;
        let is_submitting = snapshot.is_submitting();
        let pending = snapshot.pending_answer.as_deref();

        let options = question
            .options()
            .iter()
            .filter_map(|label| {
                let key = option_key(label)?;
                Some(OptionVm {
                    key: key.to_string(),
                    label: label.clone(),
                    selected: pending == Some(key),
                })
            })
            .collect();

        let remaining = snapshot.time_remaining_secs;
        let low_time_banner = (snapshot.time_running_low && remaining > 0)
            .then(|| format!("Only {} remaining!", format_clock(remaining)));

        let needs_retry = snapshot.state.is_active()
            && snapshot.time_expired()
            && snapshot.failed_submission.is_some();

        let status_banner = match snapshot.state {
            SessionState::Submitting {
                trigger: SubmitTrigger::TimeExpired,
            } => Some("Quiz time is up! Submitting your answers..."),
            _ if needs_retry => Some("Quiz time is up. Your answers have not been submitted yet."),
            _ => None,
        };

        #[allow(clippy::cast_precision_loss)]
        let progress_percent = index as f64 / total as f64 * 100.0;

        Some(Self {
            header: format!("Question {} of {}", index + 1, snapshot.total_questions),
            progress_label: format!("{}/{}", index + 1, snapshot.total_questions),
            progress_percent,
            timer_label: format_clock(remaining),
            timer_urgent: remaining <= URGENT_TIMER_SECS,
            time_spent_label: format_time_spent(snapshot.question_elapsed_secs),
            prompt: question.text().to_string(),
            options,
            is_submitting,
            can_submit: snapshot.can_submit(),
            submit_label: if is_submitting {
                "Submitting..."
            } else {
                "Submit Answer"
            },
            error_banner: snapshot.last_error.clone(),
            low_time_banner,
            needs_retry,
            status_banner,
            hint: question.explanation().map(str::to_string),
            can_show_hint: question.explanation().is_some() && !is_submitting,
        })
    }
}
