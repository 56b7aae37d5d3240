//! Domain ports for the hexagonal boundary.
//!
//! The three repository ports make up the [`Store`]; every adapter (in-memory
//! and PostgreSQL) implements all of them and passes the same contract suite.

mod macros;
pub(crate) use macros::define_port_error;

mod condominium_repository;
mod login_service;
mod store_error;
mod user_repository;
mod visit_repository;

#[cfg(test)]
pub use condominium_repository::MockCondominiumRepository;
pub use condominium_repository::CondominiumRepository;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use store_error::StoreError;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
pub use visit_repository::VisitRepository;

use crate::domain::Error;

/// Read-modify-write step applied by the `update_*` port methods.
///
/// Receives a copy of the current row and returns the replacement, or an
/// error that aborts the update and is surfaced as [`StoreError::Rejected`].
pub type Mutator<T> = Box<dyn FnOnce(T) -> Result<T, Error> + Send>;

/// Every persistence port the services need, behind one object.
pub trait Store: UserRepository + CondominiumRepository + VisitRepository {}

impl<T> Store for T where T: UserRepository + CondominiumRepository + VisitRepository {}
