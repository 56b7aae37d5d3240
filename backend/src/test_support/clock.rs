//! Controllable clock for time-dependent tests.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Instant every fixture clock starts at: 2026-03-14 12:00:00 UTC.
#[must_use]
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0) {
        chrono::LocalResult::Single(at) => at,
        _ => panic!("fixture timestamp must be unambiguous"),
    }
}

/// A [`Clock`] that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock pinned to [`fixture_now`].
    #[must_use]
    pub fn at_fixture() -> Self {
        Self::new(fixture_now())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
