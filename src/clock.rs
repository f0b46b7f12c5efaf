//! Injectable time source.
//!
//! Criteria resolution (`years_back`) and daily-drive naming both depend on
//! "now"; routing them through a trait lets tests pin the year and weekday.

use chrono::{DateTime, FixedOffset, Local};

pub trait Clock: Send + Sync {
    /// Current instant, carrying the offset it should be interpreted in.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Calendar year of the current instant.
    fn current_year(&self) -> i32 {
        use chrono::Datelike;
        self.now().year()
    }
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to a fixed instant, for tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    /// Build from an RFC 3339 timestamp, e.g. `2024-01-15T08:30:00+00:00`.
    pub fn from_rfc3339(s: &str) -> Self {
        let instant = DateTime::parse_from_rfc3339(s)
            .unwrap_or_else(|e| panic!("invalid fixed clock timestamp {:?}: {}", s, e));
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}
