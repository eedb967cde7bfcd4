pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::user::User;

pub use webhook::{WebhookNotifier, WebhookPresenceBroadcaster};

/// Errors from notification transports. Always caught and logged by the
/// fanout; never propagated to the reassignment caller.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Direct notice delivered to each affected user.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorChangeNotice {
    pub supervisor_name: Option<String>,
    pub supervisor_email: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// One presence broadcast per reassignment batch.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorChangeBroadcast {
    pub supervisor_name: String,
    pub affected_emails: Vec<String>,
    pub changed_at: DateTime<Utc>,
}

/// Display name used in broadcasts when targets end up without a supervisor.
pub const UNASSIGNED_SUPERVISOR: &str = "unassigned";

/// Best-effort per-user delivery. Single attempt, no ordering guarantee.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_to_user(
        &self,
        email: &str,
        notice: &SupervisorChangeNotice,
    ) -> Result<(), NotifyError>;
}

/// Best-effort presence-channel broadcast.
#[async_trait]
pub trait PresenceBroadcaster: Send + Sync {
    async fn broadcast_supervisor_change(
        &self,
        details: &SupervisorChangeBroadcast,
    ) -> Result<(), NotifyError>;
}

/// Delivery tallies. Internal only: logged for operators, never returned to
/// the reassignment caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
    pub broadcast_ok: bool,
}

/// Dispatches post-commit notifications for a supervisor change.
///
/// Every delivery is an independent attempt; failures are logged with the
/// target identity and skipped. Nothing here can fail the committed
/// reassignment.
pub struct NotificationFanout {
    notifier: Arc<dyn Notifier>,
    presence: Arc<dyn PresenceBroadcaster>,
}

impl NotificationFanout {
    pub fn new(notifier: Arc<dyn Notifier>, presence: Arc<dyn PresenceBroadcaster>) -> Self {
        Self { notifier, presence }
    }

    pub async fn supervisor_changed(
        &self,
        targets: &[User],
        supervisor: Option<&User>,
        changed_at: DateTime<Utc>,
    ) -> FanoutReport {
        let notice = SupervisorChangeNotice {
            supervisor_name: supervisor.map(|s| s.name.clone()),
            supervisor_email: supervisor.map(|s| s.email.clone()),
            changed_at,
        };

        let sends = targets.iter().map(|target| {
            let notice = notice.clone();
            let notifier = self.notifier.clone();
            let email = target.email.clone();
            async move {
                let outcome = notifier.send_to_user(&email, &notice).await;
                (email, outcome)
            }
        });

        let mut report = FanoutReport::default();
        for (email, outcome) in join_all(sends).await {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(target_email = %email, %error, "supervisor change notification failed");
                }
            }
        }

        let broadcast = SupervisorChangeBroadcast {
            supervisor_name: supervisor
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNASSIGNED_SUPERVISOR.to_string()),
            affected_emails: targets.iter().map(|t| t.email.clone()).collect(),
            changed_at,
        };

        match self.presence.broadcast_supervisor_change(&broadcast).await {
            Ok(()) => report.broadcast_ok = true,
            Err(error) => {
                tracing::warn!(%error, "supervisor change presence broadcast failed");
            }
        }

        tracing::info!(
            delivered = report.delivered,
            failed = report.failed,
            broadcast_ok = report.broadcast_ok,
            "supervisor change fanout complete"
        );

        report
    }
}
