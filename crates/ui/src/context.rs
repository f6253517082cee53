use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use quiz_core::model::AttemptId;
use services::QuizSessionLoop;

pub trait UiApp: Send + Sync {
    fn quiz_loop(&self) -> Arc<QuizSessionLoop>;
    /// Attempt to open straight away instead of showing the home screen.
    fn initial_attempt(&self) -> Option<AttemptId>;
    /// Where questions come from, shown on the home screen.
    fn backend_label(&self) -> String;
}

#[derive(Clone)]
pub struct AppContext {
    quiz_loop: Arc<QuizSessionLoop>,
    initial_attempt: Option<AttemptId>,
    initial_attempt_pending: Arc<AtomicBool>,
    backend_label: String,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let initial_attempt = app.initial_attempt();
        Self {
            quiz_loop: app.quiz_loop(),
            initial_attempt_pending: Arc::new(AtomicBool::new(initial_attempt.is_some())),
            initial_attempt,
            backend_label: app.backend_label(),
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.quiz_loop)
    }

    /// The launch attempt, handed out once.
    #[must_use]
    pub fn take_initial_attempt(&self) -> Option<AttemptId> {
        if self.initial_attempt_pending.swap(false, Ordering::AcqRel) {
            self.initial_attempt.clone()
        } else {
            None
        }
    }

    #[must_use]
    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
