mod home;
mod question_card;
mod quiz_session;
mod result_panel;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use home::HomeView;
pub use question_card::{HintPanel, QuestionCard};
pub use quiz_session::QuizSessionView;
pub use result_panel::QuizResultPanel;
pub use state::{ViewError, ViewState};
