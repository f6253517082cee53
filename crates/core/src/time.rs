use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Time source shared by the quiz engine and its tests.
///
/// A `Manual` clock keeps its instant behind a shared cell, so every clone
/// observes the same time. Tests keep one clone and advance it while the
/// engine holds another.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    System,
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a manually driven clock starting at the given timestamp.
    #[must_use]
    pub fn manual(at: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(Mutex::new(at)))
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Manual(at) => *at.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Moves a manual clock forward. Has no effect on `Clock::System`.
    pub fn advance(&self, delta: Duration) {
        if let Clock::Manual(at) = self {
            let mut guard = at.lock().unwrap_or_else(PoisonError::into_inner);
            *guard += delta;
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    /// Whole seconds elapsed since `since`, floored.
    #[must_use]
    pub fn elapsed_secs(&self, since: DateTime<Utc>) -> u32 {
        whole_seconds_between(since, self.now())
    }
}

/// Whole seconds from `start` to `end`, floored and clamped to `0..=u32::MAX`.
#[must_use]
pub fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let secs = (end - start).num_seconds().max(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a manual `Clock` starting at the deterministic test timestamp.
#[must_use]
pub fn manual_clock() -> Clock {
    Clock::manual(fixed_now())
}
