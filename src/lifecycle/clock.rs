// src/lifecycle/clock.rs

//! Clock port used for claim timestamps and session ids.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Provides the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at one instant, for tests and reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Frozen at a local wall-clock time like `2024-05-01 09:30:00`.
    ///
    /// Returns `None` if the text does not parse or the time does not exist
    /// in the local zone.
    pub fn at(local: &str) -> Option<Self> {
        let naive = NaiveDateTime::parse_from_str(local, CLAIM_TIME_FORMAT).ok()?;
        Local.from_local_datetime(&naive).earliest().map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Format of the claim-time field.
pub const CLAIM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
