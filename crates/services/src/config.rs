use std::env;
use std::time::Duration;

use crate::sessions::DEFAULT_LOW_TIME_THRESHOLD_SECS;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 600;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Timing knobs for a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub tick_period: Duration,
    pub low_time_threshold_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS,
        }
    }
}

/// Connection settings for the portal's quiz API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Budget used when the portal reports neither an end time nor remaining time.
    pub default_time_limit_secs: u32,
    pub timeout: Duration,
}

impl QuizApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            default_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Read `QUIZ_API_BASE_URL` and friends. `None` when no base URL is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let token = env::var("QUIZ_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let default_time_limit_secs = env::var("QUIZ_DEFAULT_TIME_LIMIT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS);
        let timeout = env::var("QUIZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map_or(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS), Duration::from_secs);

        Some(Self {
            base_url: base_url.trim().to_string(),
            token,
            default_time_limit_secs,
            timeout,
        })
    }

    /// `base_url` joined with `path`, without doubled slashes.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = QuizApiConfig::new("http://localhost:3000/api/");
        assert_eq!(
            config.endpoint("/quiz/session/submit"),
            "http://localhost:3000/api/quiz/session/submit"
        );
    }

    #[test]
    fn session_defaults_tick_every_second() {
        let config = SessionConfig::default();
        assert_eq!(config.tick_period, Duration::from_secs(1));
        assert_eq!(config.low_time_threshold_secs, 60);
    }
}
