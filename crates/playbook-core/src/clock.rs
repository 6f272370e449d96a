//! Time source.
//!
//! Session expiry and event timestamps read the clock through this trait so
//! tests can move time by hand.

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed between `earlier` and now. Negative if `earlier` lies in
    /// the future.
    fn since(&self, earlier: DateTime<Utc>) -> TimeDelta {
        self.now().signed_duration_since(earlier)
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
