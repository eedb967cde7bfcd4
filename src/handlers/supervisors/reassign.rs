// handlers/supervisors/reassign.rs - POST /api/supervisors/reassign handler

use axum::{extract::Extension, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::reassignment::SupervisorAssignment;

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    /// Target employee emails, in order. Duplicates collapse.
    pub user_emails: Vec<String>,
    /// `null` (or omitted) removes the targets' supervisor.
    pub new_supervisor_email: Option<String>,
}

/// POST /api/supervisors/reassign - Atomically point a batch of employees at
/// a new supervisor (or at none). All-or-nothing; notifications and audit are
/// post-commit side effects.
pub async fn reassign_post(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReassignRequest>,
) -> Result<Json<Value>, ApiError> {
    let assignment =
        SupervisorAssignment::new(payload.user_emails, payload.new_supervisor_email);

    let outcome = ctx
        .reassignment
        .reassign(&auth.external_id, assignment)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "affected_count": outcome.affected_count
        }
    })))
}
