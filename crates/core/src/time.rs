use chrono::{DateTime, Duration, Utc};

/// Source of "now" for anything that stamps progress or cached content.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Formats a time-spent total as `"2h 5m"`, or `"5m"` below one hour.
///
/// Negative and non-finite inputs render as `"0m"`.
#[must_use]
pub fn format_time_spent(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        // Truncation is intended: partial minutes are not shown.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = seconds as u64;
        secs
    } else {
        0
    };
    let hours = whole / 3600;
    let minutes = whole / 60 % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}
