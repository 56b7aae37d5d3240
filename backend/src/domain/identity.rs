//! Principal identity: roles, identifiers, and the per-request [`Identity`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role. The string form is what the database and the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator; bypasses every role and tenant check.
    Superadmin,
    /// Manages guards and residents of one condominium.
    Admin,
    /// Resident ("neighbor") who issues visitor passes.
    User,
    /// Validates visitor codes at the gate.
    Guard,
}

impl Role {
    /// Every role, in a stable order.
    pub const ALL: [Self; 4] = [Self::Superadmin, Self::Admin, Self::User, Self::Guard];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guard => "guard",
        }
    }

    /// Landing path for the role after login.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Superadmin => "/super/",
            Self::Admin => "/admin/",
            Self::Guard => "/guard/",
            Self::User => "/neighbor/",
        }
    }

    /// Whether accounts of this role must belong to a condominium.
    #[must_use]
    pub const fn requires_condominium(self) -> bool {
        !matches!(self, Self::Superadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guard" => Ok(Self::Guard),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw database identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Account identifier.
    UserId
);
define_id!(
    /// Condominium (tenant) identifier.
    CondominiumId
);

/// The authenticated principal resolved for one request.
///
/// Built fresh from the store on every request, so role changes and
/// disablement take effect without waiting for the cookie to expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub condominium_id: Option<CondominiumId>,
    pub role: Role,
    pub enabled: bool,
}

impl Identity {
    /// Whether this identity bypasses role and tenant scoping.
    #[must_use]
    pub const fn is_superadmin(&self) -> bool {
        matches!(self.role, Role::Superadmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Superadmin, "superadmin", "/super/")]
    #[case(Role::Admin, "admin", "/admin/")]
    #[case(Role::User, "user", "/neighbor/")]
    #[case(Role::Guard, "guard", "/guard/")]
    fn role_strings_and_home_paths(
        #[case] role: Role,
        #[case] text: &str,
        #[case] home: &str,
    ) {
        assert_eq!(role.to_string(), text);
        assert_eq!(text.parse::<Role>(), Ok(role));
        assert_eq!(role.home_path(), home);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert_eq!("resident".parse::<Role>(), Err(UnknownRole("resident".into())));
    }

    #[rstest]
    fn role_serialises_lowercase() {
        let json = serde_json::to_string(&Role::Superadmin).expect("serialise role");
        assert_eq!(json, "\"superadmin\"");
    }
}
