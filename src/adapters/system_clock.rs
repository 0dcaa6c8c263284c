//! Wall-clock time source.

use chrono::{DateTime, Utc};

use crate::traits::Clock;

/// [`Clock`] backed by the system's UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
