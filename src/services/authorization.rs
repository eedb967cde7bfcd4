use std::sync::Arc;
use thiserror::Error;

use crate::database::models::user::User;
use crate::database::users::{DirectoryError, UserDirectory};
use crate::roles::{Role, RoleChange};

/// Named boolean capability derived from role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Provision users, change roles, reassign supervisors.
    ManageUsers,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ManageUsers => "manage_users",
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        match self {
            Capability::ManageUsers => role.can_manage_users(),
        }
    }
}

/// Why a caller could not be resolved. Internal diagnostics only: both cases
/// render as the same external error so existence is not leaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCaller {
    Unknown,
    Deleted,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound { reason: MissingCaller },

    #[error("Insufficient privileges for {operation}")]
    InsufficientPrivileges { operation: String },

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl AuthError {
    /// Stable client-facing error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound { .. } => "USER_NOT_FOUND",
            AuthError::InsufficientPrivileges { .. } => "INSUFFICIENT_PRIVILEGES",
            AuthError::Directory(_) => "DIRECTORY_UNAVAILABLE",
        }
    }
}

/// Translates an opaque caller identity into an authorization decision.
/// Stateless per invocation; every check costs one directory read.
#[derive(Clone)]
pub struct AuthorizationService {
    directory: Arc<dyn UserDirectory>,
}

impl AuthorizationService {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the caller to an active user.
    pub async fn resolve_caller(&self, external_id: &str) -> Result<User, AuthError> {
        if let Some(user) = self
            .directory
            .find_active_by_external_id(external_id)
            .await?
        {
            return Ok(user);
        }

        // Classify for diagnostics; the external error is identical either way.
        let reason = match self.directory.find_by_external_id(external_id).await? {
            Some(_) => MissingCaller::Deleted,
            None => MissingCaller::Unknown,
        };
        tracing::debug!(caller = external_id, ?reason, "caller resolution failed");
        Err(AuthError::UserNotFound { reason })
    }

    /// Fail unless the caller resolves to an active user.
    pub async fn require_active(&self, external_id: &str) -> Result<(), AuthError> {
        self.resolve_caller(external_id).await.map(|_| ())
    }

    /// Resolve the caller and require a capability for the named operation.
    /// Returns the resolved caller so call sites do not pay a second read.
    pub async fn require_capability(
        &self,
        external_id: &str,
        capability: Capability,
        operation: &str,
    ) -> Result<User, AuthError> {
        let caller = self.resolve_caller(external_id).await?;

        if !capability.allows(caller.role) {
            tracing::debug!(
                caller = %caller.email,
                role = %caller.role,
                capability = capability.name(),
                operation,
                "capability check failed"
            );
            return Err(AuthError::InsufficientPrivileges {
                operation: operation.to_string(),
            });
        }

        Ok(caller)
    }

    /// Gate a role change before any mutation happens.
    ///
    /// Unassign (the soft-delete path) needs the manage-users capability.
    /// Supervisors may only set `Employee`; everyone else needs manage-users
    /// plus the hierarchy gate: a caller grants only roles at or below its own
    /// level.
    pub async fn require_role_change_allowed(
        &self,
        external_id: &str,
        change: RoleChange,
    ) -> Result<User, AuthError> {
        let caller = self.resolve_caller(external_id).await?;

        let allowed = match change {
            RoleChange::Unassign => caller.role.can_manage_users(),
            RoleChange::Set(target) => match caller.role {
                Role::Supervisor => target == Role::Employee,
                role => role.can_manage_users() && role.can_assign(target),
            },
        };

        if !allowed {
            tracing::debug!(
                caller = %caller.email,
                role = %caller.role,
                ?change,
                "role change denied"
            );
            return Err(AuthError::InsufficientPrivileges {
                operation: "user.role_change".to_string(),
            });
        }

        Ok(caller)
    }
}
