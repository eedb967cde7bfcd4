use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::user::{NewUser, User, UserRow};
use crate::roles::{Role, RoleParseError};

/// Errors surfaced by user directory adapters.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User directory unavailable: {0}")]
    Unavailable(String),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Stored role for user {user_id} is corrupt: {source}")]
    CorruptRole {
        user_id: Uuid,
        #[source]
        source: RoleParseError,
    },

    #[error("Supervisor update touched {updated} of {expected} rows")]
    PartialWrite { expected: usize, updated: usize },
}

/// Lookup and mutation seam for workforce users.
///
/// `update_supervisor` must apply to all rows or none; callers rely on readers
/// never observing a partially-updated batch.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_active_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DirectoryError>;

    /// Like `find_active_by_external_id`, but includes soft-deleted users.
    /// Used for internal diagnostics only; never exposed to callers.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DirectoryError>;

    async fn list_active(&self) -> Result<Vec<User>, DirectoryError>;

    async fn insert(&self, new_user: NewUser) -> Result<User, DirectoryError>;

    /// Change a user's role. Leaving `Employee` clears `supervisor_id`: only
    /// supervised PSOs may reference a supervisor.
    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<(), DirectoryError>;

    /// Atomically point every given user at the new supervisor (or at no
    /// supervisor). All rows or none.
    async fn update_supervisor(
        &self,
        user_ids: &[Uuid],
        supervisor_id: Option<Uuid>,
    ) -> Result<(), DirectoryError>;

    /// Soft delete: role forced to `Unassigned`, `deleted_at` stamped.
    async fn soft_delete(&self, user_id: Uuid) -> Result<(), DirectoryError>;
}

/// Postgres-backed directory over the shared application pool.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: UserRow) -> Result<User, DirectoryError> {
        let user_id = row.id;
        User::try_from(row).map_err(|source| DirectoryError::CorruptRole { user_id, source })
    }

    fn map_rows(rows: Vec<UserRow>) -> Result<Vec<User>, DirectoryError> {
        rows.into_iter().map(Self::map_row).collect()
    }
}

const USER_COLUMNS: &str =
    "id, external_id, email, name, role, supervisor_id, created_at, updated_at, deleted_at";

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_active_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1 AND deleted_at IS NULL"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::map_row).transpose()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::map_row).transpose()
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::map_row).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DirectoryError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn list_active(&self) -> Result<Vec<User>, DirectoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY name, email"
        ))
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, external_id, email, name, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.external_id)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Self::map_row(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DirectoryError::EmailTaken(new_user.email))
            }
            Err(e) => Err(DirectoryError::Database(e)),
        }
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<(), DirectoryError> {
        let mut tx = self.pool.begin().await?;

        // Non-employees are not supervised PSOs; clear the link in the same
        // statement so the invariant cannot be observed broken.
        let result = sqlx::query(
            "UPDATE users
             SET role = $2,
                 supervisor_id = CASE WHEN $2 = 'EMPLOYEE' THEN supervisor_id ELSE NULL END,
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DirectoryError::NotFound(user_id));
        }

        // A supervisor reference is only valid while its user holds the
        // Supervisor role; release any reports when that stops being true.
        if role != Role::Supervisor {
            sqlx::query(
                "UPDATE users SET supervisor_id = NULL, updated_at = NOW()
                 WHERE supervisor_id = $1",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_supervisor(
        &self,
        user_ids: &[Uuid],
        supervisor_id: Option<Uuid>,
    ) -> Result<(), DirectoryError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users
             SET supervisor_id = $1, updated_at = NOW()
             WHERE id = ANY($2) AND deleted_at IS NULL",
        )
        .bind(supervisor_id)
        .bind(user_ids)
        .execute(&mut *tx)
        .await?;

        let updated = result.rows_affected() as usize;
        if updated != user_ids.len() {
            tx.rollback().await?;
            return Err(DirectoryError::PartialWrite {
                expected: user_ids.len(),
                updated,
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users
             SET role = 'UNASSIGNED', supervisor_id = NULL, deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DirectoryError::NotFound(user_id));
        }

        // Deleted users cannot supervise anyone.
        sqlx::query(
            "UPDATE users SET supervisor_id = NULL, updated_at = NOW()
             WHERE supervisor_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
