//! Injectable wall clock.
//!
//! Day boundaries for streaks are evaluated in one fixed offset no matter
//! where the process runs, so every clock reports time already shifted into
//! that offset.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::Arc;

/// UTC-03:00, the offset of America/Sao_Paulo since it dropped daylight saving.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// Converts an offset in minutes to a `FixedOffset`, falling back to UTC for
/// out-of-range values.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix())
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn with_offset_minutes(minutes: i32) -> Self {
        Self::new(offset_from_minutes(minutes))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock frozen at one instant; tests move it with [`FixedClock::set`].
#[derive(Debug)]
pub struct FixedClock {
    now: std::sync::Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// Parses an RFC 3339 timestamp such as `2024-01-10T20:00:00-03:00`.
    pub fn at(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339).ok().map(Self::new)
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
