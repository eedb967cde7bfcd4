// handlers/users/role.rs - PUT /api/users/:email/role handler

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::handlers::users::user_to_json;
use crate::middleware::auth::AuthUser;
use crate::roles::{Role, RoleChange};

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    /// `null` (or omitted) unassigns: role forced to UNASSIGNED and the user
    /// soft-deleted.
    pub role: Option<Role>,
}

/// PUT /api/users/:email/role - Change a user's role.
pub async fn role_put(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(auth): Extension<AuthUser>,
    Path(email): Path<String>,
    Json(payload): Json<RoleChangeRequest>,
) -> Result<Json<Value>, ApiError> {
    let change = RoleChange::from_wire(payload.role);
    let user = ctx
        .users
        .change_role(&auth.external_id, &email, change)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": user_to_json(&user)
    })))
}
