//! Caller identity as reported by the membership service.

use rxl_core::OrgRole;
use thiserror::Error;

/// Membership lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The caller's credential lacks a required attribute.
    #[error("caller credential has no {0} attribute")]
    MissingAttribute(&'static str),

    /// The membership service could not be consulted.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves who is calling the current invocation.
///
/// The role is returned raw; recognizing it is the caller's concern.
pub trait IdentityProvider: Send + Sync {
    /// Organizational role string, e.g. `"Manufacturer"`.
    fn caller_role(&self) -> Result<String, IdentityError>;

    /// Unique caller identity.
    fn caller_id(&self) -> Result<String, IdentityError>;
}

/// A fixed identity. Useful for tests and single-tenant embedders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    role: String,
    id: String,
}

impl StaticIdentity {
    /// An identity with an arbitrary role string.
    pub fn new(role: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            id: id.into(),
        }
    }

    /// An identity holding a recognized role.
    pub fn of(role: OrgRole, id: impl Into<String>) -> Self {
        Self::new(role.as_str(), id)
    }
}

impl IdentityProvider for StaticIdentity {
    fn caller_role(&self) -> Result<String, IdentityError> {
        Ok(self.role.clone())
    }

    fn caller_id(&self) -> Result<String, IdentityError> {
        Ok(self.id.clone())
    }
}
