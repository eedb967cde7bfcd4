use anyhow::Context;
use std::sync::Arc;

use crate::config;
use crate::database::audit::PgAuditSink;
use crate::database::manager::DatabaseManager;
use crate::database::users::PgUserDirectory;
use crate::notify::{NotificationFanout, WebhookNotifier, WebhookPresenceBroadcaster};
use crate::services::authorization::AuthorizationService;
use crate::services::reassignment::SupervisorReassignment;
use crate::services::users::UserAdminService;

/// Shared service wiring handed to every request handler.
pub struct AppContext {
    pub authorization: AuthorizationService,
    pub users: UserAdminService,
    pub reassignment: SupervisorReassignment,
}

impl AppContext {
    /// Wire the production adapters: Postgres directory and audit sink,
    /// webhook notification transports.
    pub async fn from_env() -> anyhow::Result<Arc<Self>> {
        let pool = DatabaseManager::main_pool()
            .await
            .context("failed to connect to the application database")?;

        let directory = Arc::new(PgUserDirectory::new(pool.clone()));
        let audit = Arc::new(PgAuditSink::new(pool));

        let notify_config = &config::config().notify;
        let notifier = Arc::new(
            WebhookNotifier::from_config(notify_config)
                .context("failed to build notification client")?,
        );
        let presence = Arc::new(
            WebhookPresenceBroadcaster::from_config(notify_config)
                .context("failed to build presence client")?,
        );

        let authorization = AuthorizationService::new(directory.clone());
        let fanout = NotificationFanout::new(notifier, presence);

        Ok(Arc::new(Self {
            authorization: authorization.clone(),
            users: UserAdminService::new(authorization.clone(), directory.clone(), audit.clone()),
            reassignment: SupervisorReassignment::new(authorization, directory, fanout, audit),
        }))
    }
}
