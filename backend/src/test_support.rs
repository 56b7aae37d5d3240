//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature). Nothing here is compiled into release builds.

pub mod clock;
pub mod fixtures;
pub mod store_contract;

pub use clock::MutableClock;
