//! Authorization error model.

use thiserror::Error;

/// Result type used by registry mutators.
pub type RbacResult<T> = Result<T, RbacError>;

/// Registry mutation failure.
///
/// Both kinds are operator/programmer errors reported synchronously. They are
/// never transient, so there is nothing to retry. Decision operations never
/// produce these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// The named role is not defined in the role store.
    #[error("role not found: '{0}'")]
    RoleNotFound(String),

    /// The named role is protected and cannot be deleted.
    #[error("role '{0}' is protected and cannot be deleted")]
    ProtectedRole(String),
}

impl RbacError {
    pub fn role_not_found(name: impl Into<String>) -> Self {
        Self::RoleNotFound(name.into())
    }

    pub fn protected_role(name: impl Into<String>) -> Self {
        Self::ProtectedRole(name.into())
    }

    /// Name of the role the failure refers to.
    pub fn role_name(&self) -> &str {
        match self {
            RbacError::RoleNotFound(name) | RbacError::ProtectedRole(name) => name,
        }
    }
}
