//! Visitor management for condominiums.
//!
//! Superadmins manage condominiums and their admins, admins manage the
//! residents and guards of one condominium, residents issue visit passes, and
//! guards admit visitors against them. Everything is exposed as a
//! session-authenticated JSON API over a pluggable store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
