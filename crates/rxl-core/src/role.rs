//! # Organizational Roles
//!
//! The membership service reports a free-form role string for each caller.
//! Only four values carry authority; everything else resolves to
//! [`CallerRole::Unrecognized`] and is denied by every gated operation.

use serde::{Deserialize, Serialize};

/// A recognized organizational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    /// Creates batches and ships them.
    Manufacturer,
    /// Moves batches between transit and delivery.
    Distributor,
    /// Sells delivered batches.
    Pharmacy,
    /// Flags batches and produces compliance views.
    Regulator,
}

impl OrgRole {
    /// Every recognized role, in declaration order.
    pub const ALL: [OrgRole; 4] = [
        Self::Manufacturer,
        Self::Distributor,
        Self::Pharmacy,
        Self::Regulator,
    ];

    /// Return the wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manufacturer => "Manufacturer",
            Self::Distributor => "Distributor",
            Self::Pharmacy => "Pharmacy",
            Self::Regulator => "Regulator",
        }
    }

    /// Parse an exact wire name. Matching is case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role of the caller of one invocation, as resolved from membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallerRole {
    /// One of the four recognized roles.
    Org(OrgRole),
    /// Any other reported value. Carries the raw string for error messages.
    Unrecognized(String),
}

impl CallerRole {
    /// Resolve a raw membership role string.
    pub fn resolve(raw: &str) -> Self {
        match OrgRole::parse(raw) {
            Some(role) => Self::Org(role),
            None => Self::Unrecognized(raw.to_string()),
        }
    }

    /// The recognized role, if any.
    pub fn org(&self) -> Option<OrgRole> {
        match self {
            Self::Org(role) => Some(*role),
            Self::Unrecognized(_) => None,
        }
    }

    /// Whether the caller holds exactly the given role.
    pub fn is(&self, role: OrgRole) -> bool {
        self.org() == Some(role)
    }
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Org(role) => f.write_str(role.as_str()),
            Self::Unrecognized(raw) => write!(f, "{raw:?}"),
        }
    }
}
