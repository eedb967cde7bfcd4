use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::database::audit::AuditSink;
use crate::database::models::audit::AuditEntry;
use crate::database::models::user::{NewUser, User};
use crate::database::users::{DirectoryError, UserDirectory};
use crate::roles::{Role, RoleChange};
use crate::services::authorization::{AuthError, AuthorizationService, Capability};
use crate::services::reassignment::ValidationError;
use crate::services::{is_valid_email, normalize_email};

#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Thin administration surface around the directory: provisioning, role
/// changes (including the soft-delete path), and listing. Every mutation is
/// gated by the authorization service first and audited after.
pub struct UserAdminService {
    authorization: AuthorizationService,
    directory: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditSink>,
}

impl UserAdminService {
    pub fn new(
        authorization: AuthorizationService,
        directory: Arc<dyn UserDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            authorization,
            directory,
            audit,
        }
    }

    /// Provision a user with an initial role.
    pub async fn create_user(
        &self,
        caller_external_id: &str,
        external_id: String,
        raw_email: &str,
        name: String,
        role: Role,
    ) -> Result<User, UserAdminError> {
        let caller = self
            .authorization
            .require_role_change_allowed(caller_external_id, RoleChange::Set(role))
            .await?;

        let email = normalize_email(raw_email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmailFormat(email).into());
        }

        let user = self
            .directory
            .insert(NewUser {
                external_id,
                email,
                name,
                role,
            })
            .await?;

        self.record_audit(AuditEntry::new(
            "user",
            user.id,
            "user.create",
            caller.id,
            Value::Null,
            json!({ "email": user.email, "role": user.role.as_str() }),
        ))
        .await;

        tracing::info!(caller = %caller.email, user = %user.email, role = %user.role, "user provisioned");
        Ok(user)
    }

    /// Apply a role change to the user behind `raw_email`. `Unassign` is the
    /// soft-delete path: role forced to `Unassigned`, record marked deleted.
    pub async fn change_role(
        &self,
        caller_external_id: &str,
        raw_email: &str,
        change: RoleChange,
    ) -> Result<User, UserAdminError> {
        let caller = self
            .authorization
            .require_role_change_allowed(caller_external_id, change)
            .await?;

        let email = normalize_email(raw_email);
        let target = self
            .directory
            .find_active_by_email(&email)
            .await?
            .ok_or_else(|| ValidationError::TargetUserNotFound(email.clone()))?;

        match change {
            RoleChange::Set(role) => {
                self.directory.update_role(target.id, role).await?;

                self.record_audit(AuditEntry::new(
                    "user",
                    target.id,
                    "user.role_change",
                    caller.id,
                    json!({ "role": target.role.as_str() }),
                    json!({ "role": role.as_str() }),
                ))
                .await;

                tracing::info!(caller = %caller.email, user = %target.email, role = %role, "role changed");
            }
            RoleChange::Unassign => {
                self.directory.soft_delete(target.id).await?;

                self.record_audit(AuditEntry::new(
                    "user",
                    target.id,
                    "user.soft_delete",
                    caller.id,
                    json!({ "role": target.role.as_str(), "deleted": false }),
                    json!({ "role": Role::Unassigned.as_str(), "deleted": true }),
                ))
                .await;

                tracing::info!(caller = %caller.email, user = %target.email, "user soft-deleted");
            }
        }

        // Re-read so callers see the post-change record.
        let refreshed = self.directory.find_by_ids(&[target.id]).await?;
        Ok(refreshed.into_iter().next().unwrap_or(target))
    }

    /// Active users, for callers allowed to manage them.
    pub async fn list_users(&self, caller_external_id: &str) -> Result<Vec<User>, UserAdminError> {
        self.authorization
            .require_capability(caller_external_id, Capability::ManageUsers, "user.list")
            .await?;
        Ok(self.directory.list_active().await?)
    }

    async fn record_audit(&self, entry: AuditEntry) {
        if let Err(error) = self.audit.record(entry).await {
            tracing::error!(%error, "audit write failed");
        }
    }
}
