// handlers/users/list.rs - GET /api/users handler

use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::handlers::users::user_to_json;
use crate::middleware::auth::AuthUser;

/// GET /api/users - Active users, for callers with the manage-users capability.
pub async fn users_get(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let users = ctx.users.list_users(&auth.external_id).await?;
    let data: Vec<Value> = users.iter().map(user_to_json).collect();

    Ok(Json(json!({
        "success": true,
        "data": data
    })))
}
