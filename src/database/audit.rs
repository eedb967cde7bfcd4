use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::database::models::audit::AuditEntry;

/// Errors surfaced by audit sink adapters.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only audit trail seam. Failures here never roll back the mutation
/// being audited; callers log them for operators and move on.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

/// Postgres-backed sink appending to the audit_log table.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        sqlx::query(
            "INSERT INTO audit_log (entity, entity_id, action, actor_id, before, after, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&entry.entity)
        .bind(entry.entity_id)
        .bind(&entry.action)
        .bind(entry.actor_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
