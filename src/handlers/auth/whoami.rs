// handlers/auth/whoami.rs - GET /api/auth/whoami handler

use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// GET /api/auth/whoami - Current authenticated caller, as the directory sees
/// them. Resolves through the authorization service so a revoked or
/// soft-deleted caller is turned away even with a still-valid token.
pub async fn whoami_get(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let user = ctx.authorization.resolve_caller(&auth.external_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": user.id,
            "external_id": user.external_id,
            "email": user.email,
            "name": user.name,
            "role": user.role.as_str(),
            "supervisor_id": user.supervisor_id,
            "created_at": user.created_at,
        }
    })))
}
