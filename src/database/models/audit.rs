use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Append-only audit record. One entry is written per mutated entity; entries
/// are never updated or deleted by this service.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub entity: String,
    pub entity_id: Uuid,
    pub action: String,
    pub actor_id: Uuid,
    pub before: Value,
    pub after: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        entity: impl Into<String>,
        entity_id: Uuid,
        action: impl Into<String>,
        actor_id: Uuid,
        before: Value,
        after: Value,
    ) -> Self {
        Self {
            entity: entity.into(),
            entity_id,
            action: action.into(),
            actor_id,
            before,
            after,
            created_at: Utc::now(),
        }
    }
}
