mod quiz_result_vm;
mod quiz_session_vm;
mod time_fmt;

pub use quiz_result_vm::QuizResultVm;
pub use quiz_session_vm::{OptionVm, QuizSessionVm, URGENT_TIMER_SECS};
pub use time_fmt::{format_clock, format_time_spent};
