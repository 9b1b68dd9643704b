use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::events::{NotifyError, Subscriber};
use crate::transition::TransitionEvent;

/// Human readable alert for a transition, in Slack mrkdwn.
pub fn render_message(event: &TransitionEvent) -> String {
    if event.up {
        format!("*{} is back up.*", event.site.url)
    } else {
        format!("*{} is down!*", event.site.url)
    }
}

/// Posts transition alerts to a Slack incoming webhook.
///
/// Without a webhook URL every event is logged and skipped.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        Ok(Self { client, webhook_url })
    }

    pub async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let Some(url) = &self.webhook_url else {
            info!("No slack webhook url defined, skipping slack notification");
            return Ok(());
        };

        let response = self.client.post(url).json(&json!({ "text": text })).send().await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        info!(status = status.as_u16(), "Slack notification sent");
        Ok(())
    }
}

#[async_trait]
impl Subscriber for SlackNotifier {
    fn name(&self) -> &str {
        "slack-notification"
    }

    async fn handle(&self, event: &TransitionEvent) -> Result<(), NotifyError> {
        self.notify(&render_message(event)).await
    }
}
