//! Request middleware.
//!
//! Purpose: request lifecycle concerns that apply to every route, such as
//! trace correlation and the per-request log line.

pub mod trace;

pub use trace::Trace;
