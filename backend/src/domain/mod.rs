//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed entities of the visitor management
//! system, the access-control gate, and the services that drive the store
//! ports. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - [`Identity`], [`Role`] and the [`rbac`] gate functions.
//! - [`Account`], [`Condominium`], [`Visit`] and their drafts.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - Services: [`AccountService`], [`CondominiumService`], [`VisitService`],
//!   [`PasswordLoginService`], and [`ensure_superadmin`].

pub mod account;
pub mod account_service;
pub mod auth;
pub mod bootstrap;
pub mod condominium;
pub mod condominium_service;
pub mod error;
pub mod identity;
pub mod login_service;
pub mod password;
pub mod ports;
pub mod rbac;
pub mod trace_id;
pub mod validation;
pub mod visit;
pub mod visit_service;

pub use self::account::{Account, AccountFilter, NewAccount, normalize_email};
pub use self::account_service::{AccountService, AdminDraft, AccountChanges, MemberDraft};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::bootstrap::{
    BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD, BootstrapOutcome, ensure_superadmin,
};
pub use self::condominium::{Condominium, NewCondominium};
pub use self::condominium_service::{CondominiumDraft, CondominiumService};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::identity::{CondominiumId, Identity, Role, UnknownRole, UserId};
pub use self::login_service::PasswordLoginService;
pub use self::password::{PasswordError, PlainPassword, hash_password, verify_password};
pub use self::rbac::{require_any_role, require_role, require_role_and_condo};
pub use self::trace_id::TraceId;
pub use self::validation::FieldError;
pub use self::visit::{NewVisit, Visit, VisitCode, VisitUnusable};
pub use self::visit_service::{VisitInspection, VisitRequest, VisitService};

/// Convenient result alias for handlers and services.
///
/// # Examples
/// ```
/// use entry_watch::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
