// handlers/users/create.rs - POST /api/users handler

use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::handlers::users::user_to_json;
use crate::middleware::auth::AuthUser;
use crate::roles::Role;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// POST /api/users - Provision a user with an initial role.
///
/// The caller must be allowed to grant the requested role; the same guard
/// covers role changes on existing users.
pub async fn user_post(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = ctx
        .users
        .create_user(
            &auth.external_id,
            payload.external_id,
            &payload.email,
            payload.name,
            payload.role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": user_to_json(&user)
        })),
    ))
}
