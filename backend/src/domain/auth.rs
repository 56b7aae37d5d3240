//! Login credentials.
//!
//! Inbound adapters build [`LoginCredentials`] from raw strings before
//! talking to the login service, so blank input never reaches the store.

use std::fmt;

use zeroize::Zeroizing;

use super::account::normalize_email;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased, and non-empty.
/// - `password` is non-empty and kept byte-for-byte; it is wiped on drop.
///
/// # Examples
/// ```
/// use entry_watch::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" SuperAdmin@Local ", "password").unwrap();
/// assert_eq!(creds.email(), "superadmin@local");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] for blank inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}
