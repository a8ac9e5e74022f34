//! Delivers notifications as JSON POSTs to a configured endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::{Notification, Notifier, PublishError};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookNotifier {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(WebhookNotifier { client, endpoint })
    }
}

impl Notifier for WebhookNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        let body = serde_json::to_vec(notification)?;
        debug!(
            endpoint = %self.endpoint,
            kind = notification.kind(),
            bytes = body.len(),
            "Posting notification"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
