//! Webhook audit sink (Slack incoming-webhook payload)

use crate::config::WebhookConfig;
use fieldguard_core::{AuditEvent, AuditSink, Error, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// JSON body posted for each event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// POSTs one JSON payload per event
#[derive(Debug)]
pub struct WebhookSink {
    client: Client,
    config: WebhookConfig,
}

impl WebhookSink {
    /// Create a new webhook sink
    pub fn new(config: WebhookConfig) -> Result<Self> {
        reqwest::Url::parse(&config.url)
            .map_err(|e| Error::config(format!("invalid webhook url '{}': {}", config.url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Payload for an event
    pub fn payload(&self, event: &AuditEvent) -> WebhookPayload {
        WebhookPayload {
            text: self.config.message.render(event),
            channel: self.config.channel.clone(),
            username: self.config.username.clone(),
            icon_emoji: self.config.icon_emoji.clone(),
            icon_url: self.config.icon_url.clone(),
        }
    }
}

impl AuditSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&self.payload(event))
            .send()
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().unwrap_or_default();
            return Err(Error::audit(
                self.name(),
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        debug!(field = %event.field, status = status.as_u16(), "posted audit webhook");
        Ok(())
    }
}
