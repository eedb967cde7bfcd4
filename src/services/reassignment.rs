use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::audit::AuditSink;
use crate::database::models::audit::AuditEntry;
use crate::database::models::user::User;
use crate::database::users::{DirectoryError, UserDirectory};
use crate::notify::NotificationFanout;
use crate::roles::Role;
use crate::services::authorization::{AuthError, AuthorizationService, Capability};
use crate::services::{is_valid_email, normalize_email};

/// Bulk supervisor change command. Treated as immutable once constructed:
/// targets are an ordered set of employee emails, `new_supervisor_email: None`
/// means "unassign".
#[derive(Debug, Clone)]
pub struct SupervisorAssignment {
    pub user_emails: Vec<String>,
    pub new_supervisor_email: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl SupervisorAssignment {
    pub fn new(user_emails: Vec<String>, new_supervisor_email: Option<String>) -> Self {
        Self {
            user_emails,
            new_supervisor_email,
            requested_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("At least one target employee email is required")]
    EmployeeEmailRequired,

    #[error("Invalid email format: {0}")]
    InvalidEmailFormat(String),

    #[error("Target user not found: {0}")]
    TargetUserNotFound(String),

    #[error("Target user has the wrong role: {0}")]
    TargetNotEmployee(String),
}

impl ValidationError {
    /// Stable client-facing error code
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::EmployeeEmailRequired => "EMPLOYEE_EMAIL_REQUIRED",
            ValidationError::InvalidEmailFormat(_) => "INVALID_EMAIL_FORMAT",
            ValidationError::TargetUserNotFound(_) => "TARGET_USER_NOT_FOUND",
            ValidationError::TargetNotEmployee(_) => "TARGET_NOT_EMPLOYEE",
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Supervisor assignment failed")]
    AssignmentFailed {
        #[source]
        source: DirectoryError,
    },
}

impl SupervisorError {
    /// Stable client-facing error code
    pub fn error_code(&self) -> &'static str {
        match self {
            SupervisorError::Auth(e) => e.error_code(),
            SupervisorError::Validation(e) => e.error_code(),
            SupervisorError::Directory(_) => "DIRECTORY_UNAVAILABLE",
            SupervisorError::AssignmentFailed { .. } => "SUPERVISOR_ASSIGNMENT_FAILED",
        }
    }
}

/// Caller-visible result: how many users were pointed at the new supervisor.
/// Notification tallies stay internal.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ReassignmentOutcome {
    pub affected_count: usize,
}

/// Orchestrates a validated, atomic bulk supervisor change and its
/// best-effort side effects.
///
/// Gate order: authorization, email validation, supervisor resolution, target
/// eligibility, then one atomic persistence step. Fanout and audit run after
/// commit and can never undo it.
pub struct SupervisorReassignment {
    authorization: AuthorizationService,
    directory: Arc<dyn UserDirectory>,
    fanout: NotificationFanout,
    audit: Arc<dyn AuditSink>,
}

impl SupervisorReassignment {
    pub fn new(
        authorization: AuthorizationService,
        directory: Arc<dyn UserDirectory>,
        fanout: NotificationFanout,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            authorization,
            directory,
            fanout,
            audit,
        }
    }

    pub async fn reassign(
        &self,
        caller_external_id: &str,
        assignment: SupervisorAssignment,
    ) -> Result<ReassignmentOutcome, SupervisorError> {
        // 1. Authorization gate, before any target is read.
        let caller = self
            .authorization
            .require_capability(caller_external_id, Capability::ManageUsers, "supervisor.reassign")
            .await?;

        // 2. Syntactic validation and normalization of the target set.
        let target_emails = normalize_target_emails(&assignment.user_emails)?;

        // 3. The new supervisor, when given, must be an active Supervisor.
        let new_supervisor = match assignment.new_supervisor_email.as_deref() {
            Some(raw) => Some(self.resolve_supervisor(raw).await?),
            None => None,
        };

        // 4. Every target must be an active Employee. Any miss fails the
        //    whole batch; nothing has been written yet.
        let mut targets = Vec::with_capacity(target_emails.len());
        for email in &target_emails {
            let user = self
                .directory
                .find_active_by_email(email)
                .await?
                .ok_or_else(|| ValidationError::TargetUserNotFound(email.clone()))?;
            if user.role != Role::Employee {
                return Err(ValidationError::TargetNotEmployee(email.clone()).into());
            }
            targets.push(user);
        }

        // 5. One atomic multi-row update. All rows or none.
        let target_ids: Vec<Uuid> = targets.iter().map(|t| t.id).collect();
        let supervisor_id = new_supervisor.as_ref().map(|s| s.id);
        self.directory
            .update_supervisor(&target_ids, supervisor_id)
            .await
            .map_err(|source| {
                tracing::error!(
                    caller = %caller.email,
                    targets = target_ids.len(),
                    %source,
                    "supervisor assignment write failed"
                );
                SupervisorError::AssignmentFailed { source }
            })?;

        // 6. Post-commit fanout. Failures are logged inside and skipped.
        self.fanout
            .supervisor_changed(&targets, new_supervisor.as_ref(), assignment.requested_at)
            .await;

        // 7. Audit trail, one entry per mutated user. A sink failure leaves a
        //    trail gap but the committed change stands.
        for target in &targets {
            let entry = AuditEntry::new(
                "user",
                target.id,
                "supervisor.reassign",
                caller.id,
                json!({ "supervisor_id": target.supervisor_id }),
                json!({ "supervisor_id": supervisor_id }),
            );
            if let Err(error) = self.audit.record(entry).await {
                tracing::error!(
                    user_id = %target.id,
                    %error,
                    "audit write failed after supervisor reassignment"
                );
            }
        }

        tracing::info!(
            caller = %caller.email,
            affected = targets.len(),
            supervisor = new_supervisor.as_ref().map(|s| s.email.as_str()).unwrap_or("none"),
            "supervisor reassignment committed"
        );

        Ok(ReassignmentOutcome {
            affected_count: targets.len(),
        })
    }

    async fn resolve_supervisor(&self, raw_email: &str) -> Result<User, SupervisorError> {
        let email = normalize_email(raw_email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmailFormat(email).into());
        }

        let user = self
            .directory
            .find_active_by_email(&email)
            .await?
            .ok_or_else(|| ValidationError::TargetUserNotFound(email.clone()))?;

        if user.role != Role::Supervisor {
            // Wrong-role code is shared with the target checks.
            return Err(ValidationError::TargetNotEmployee(email).into());
        }

        Ok(user)
    }
}

/// Normalize, syntax-check, and de-duplicate the target emails, preserving
/// first-occurrence order.
fn normalize_target_emails(raw: &[String]) -> Result<Vec<String>, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmployeeEmailRequired);
    }

    let mut emails = Vec::with_capacity(raw.len());
    for candidate in raw {
        let email = normalize_email(candidate);
        if email.is_empty() {
            return Err(ValidationError::EmployeeEmailRequired);
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmailFormat(email));
        }
        if !emails.contains(&email) {
            emails.push(email);
        }
    }

    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_target_list_is_rejected() {
        let err = normalize_target_emails(&[]).unwrap_err();
        assert_eq!(err.error_code(), "EMPLOYEE_EMAIL_REQUIRED");
    }

    #[test]
    fn blank_entry_is_rejected() {
        let err = normalize_target_emails(&["   ".to_string()]).unwrap_err();
        assert_eq!(err.error_code(), "EMPLOYEE_EMAIL_REQUIRED");
    }

    #[test]
    fn malformed_entry_is_rejected() {
        let err = normalize_target_emails(&["not-an-email".to_string()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_EMAIL_FORMAT");
    }

    #[test]
    fn duplicates_collapse_preserving_order() {
        let emails = normalize_target_emails(&[
            "B@x.com".to_string(),
            "a@x.com".to_string(),
            "b@X.com".to_string(),
        ])
        .unwrap();
        assert_eq!(emails, vec!["b@x.com".to_string(), "a@x.com".to_string()]);
    }
}
