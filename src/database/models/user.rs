use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::roles::{Role, RoleParseError};

/// Raw users row as stored. The role column is text; it is parsed into the
/// closed [`Role`] enum before anything downstream sees it.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A workforce user. Soft-deleted users keep their row; `deleted_at` marks
/// them inactive and their role is forced to `Unassigned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Fields required to provision a user. Email is expected to be normalized
/// (trimmed, lower-cased) before this is constructed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl TryFrom<UserRow> for User {
    type Error = RoleParseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>()?;
        Ok(User {
            id: row.id,
            external_id: row.external_id,
            email: row.email,
            name: row.name,
            role,
            supervisor_id: row.supervisor_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
