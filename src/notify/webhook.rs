use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::config::NotifyConfig;
use crate::notify::{
    Notifier, NotifyError, PresenceBroadcaster, SupervisorChangeBroadcast, SupervisorChangeNotice,
};

/// Delivers direct user notices by POSTing to the presence hub.
pub struct WebhookNotifier {
    client: reqwest::Client,
    hub_url: String,
}

impl WebhookNotifier {
    pub fn from_config(config: &NotifyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            hub_url: config.hub_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_to_user(
        &self,
        email: &str,
        notice: &SupervisorChangeNotice,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/notify", self.hub_url);
        self.client
            .post(&url)
            .json(&json!({
                "email": email,
                "event": "supervisor.changed",
                "notice": notice,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Publishes the per-batch supervisor change to the presence channel.
pub struct WebhookPresenceBroadcaster {
    client: reqwest::Client,
    hub_url: String,
}

impl WebhookPresenceBroadcaster {
    pub fn from_config(config: &NotifyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            hub_url: config.hub_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PresenceBroadcaster for WebhookPresenceBroadcaster {
    async fn broadcast_supervisor_change(
        &self,
        details: &SupervisorChangeBroadcast,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/broadcast", self.hub_url);
        self.client
            .post(&url)
            .json(&json!({
                "event": "supervisor.changed",
                "details": details,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
