use services::{ProviderError, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    Closed,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NotFound => "This quiz attempt could not be found.",
            ViewError::Closed => "This quiz session is no longer active.",
            ViewError::Unknown => "Could not load the quiz. Please try again.",
        }
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Provider(ProviderError::NotFound(_)) => ViewError::NotFound,
            SessionError::Provider(ProviderError::NotActive { .. }) => ViewError::Closed,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Error(ViewError),
}
