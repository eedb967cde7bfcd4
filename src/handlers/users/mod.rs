pub mod create;
pub mod list;
pub mod role;

pub use create::user_post;
pub use list::users_get;
pub use role::role_put;

use serde_json::{json, Value};

use crate::database::models::user::User;

/// Public wire shape for a user record.
pub(crate) fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "external_id": user.external_id,
        "email": user.email,
        "name": user.name,
        "role": user.role.as_str(),
        "supervisor_id": user.supervisor_id,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
        "deleted_at": user.deleted_at,
    })
}
