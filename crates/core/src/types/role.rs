//! User roles and the permissions they carry.

use serde::{Deserialize, Serialize};

/// Permission level attached to a signed-in user.
///
/// Roles come from a free-text `role` attribute on the user's backend
/// record, so parsing is deliberately lenient: anything that is not a
/// recognized role collapses to [`Role::Viewer`], the least privileged
/// level. See [`Role::from_attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access to the catalog.
    Viewer,
    /// Can create and edit catalog entries.
    Manager,
    /// Can create, edit, and delete catalog entries.
    Admin,
}

impl Role {
    /// Map a stored role attribute to a `Role`.
    ///
    /// The attribute is uppercased before matching, so `"admin"`,
    /// `"Admin"`, and `"ADMIN"` are equivalent. A missing attribute or an
    /// unrecognized value yields `Viewer` — the fail-safe default for
    /// records written by hand or by older tooling.
    #[must_use]
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute.map(str::to_uppercase).as_deref() {
            Some("ADMIN") => Self::Admin,
            Some("MANAGER") => Self::Manager,
            _ => Self::Viewer,
        }
    }

    /// Whether this role may create or edit catalog entries.
    #[must_use]
    pub const fn can_modify(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }

    /// Whether this role may delete catalog entries.
    #[must_use]
    pub const fn can_delete(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewer => write!(f, "Viewer"),
            Self::Manager => write!(f, "Manager"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
