//! Outbound adapters implementing the store ports.
//!
//! - **memory**: a process-local store for development and tests.
//! - **persistence**: PostgreSQL through Diesel.
//!
//! Adapters translate between domain types and their storage
//! representation and contain no business rules beyond the invariants the
//! ports require.

pub mod memory;
pub mod persistence;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use mockable::Clock;

/// Current time truncated to microseconds, the precision of `timestamptz`.
///
/// Every adapter stamps rows with this so stored timestamps compare equal
/// across backends.
pub(crate) fn storage_now(clock: &dyn Clock) -> DateTime<Utc> {
    let now = clock.utc();
    now.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(now)
}
