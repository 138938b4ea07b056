//! Audit channel configuration

use crate::composite::CompositeSink;
use crate::console::ConsoleSink;
use crate::database::DatabaseSink;
use crate::email::EmailSink;
use crate::template::MessageTemplate;
use crate::webhook::WebhookSink;
use fieldguard_core::{AuditSink, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable holding a comma-separated channel list
pub const CHANNELS_ENV: &str = "FIELDGUARD_AUDIT_CHANNELS";

/// Audit delivery channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditChannel {
    Console,
    #[serde(alias = "slack")]
    Webhook,
    Email,
    Database,
}

impl AuditChannel {
    /// Every channel, in dispatch order
    pub const ALL: [AuditChannel; 4] = [
        AuditChannel::Console,
        AuditChannel::Webhook,
        AuditChannel::Email,
        AuditChannel::Database,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Webhook => "webhook",
            Self::Email => "email",
            Self::Database => "database",
        }
    }
}

impl std::fmt::Display for AuditChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            // Slack incoming webhooks are the common case
            "webhook" | "slack" => Ok(Self::Webhook),
            "email" => Ok(Self::Email),
            "database" => Ok(Self::Database),
            other => Err(Error::config(format!("unknown audit channel '{}'", other))),
        }
    }
}

/// Audit configuration: enabled channels plus per-channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enabled channels
    #[serde(default = "default_channels")]
    pub channels: BTreeSet<AuditChannel>,

    /// Stream the console channel writes to
    #[serde(default)]
    pub console: ConsoleTarget,

    /// Webhook settings, required when `webhook` is enabled
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,

    /// Email settings, required when `email` is enabled
    #[serde(default)]
    pub email: Option<EmailConfig>,

    /// Database settings; defaults apply when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AuditConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Replace the enabled channels from a comma-separated list such as
    /// `"CONSOLE,WEBHOOK"`. Blank input leaves the set unchanged; unknown
    /// names are logged and skipped.
    pub fn configure_from_str(&mut self, channels: &str) {
        if channels.trim().is_empty() {
            return;
        }

        self.channels.clear();
        for name in channels.split(',').filter(|n| !n.trim().is_empty()) {
            match name.parse::<AuditChannel>() {
                Ok(channel) => {
                    self.channels.insert(channel);
                }
                Err(e) => warn!(channel = %name.trim(), error = %e, "ignoring audit channel"),
            }
        }
    }

    /// Apply `FIELDGUARD_AUDIT_CHANNELS` if set
    pub fn apply_env(&mut self) {
        if let Ok(channels) = std::env::var(CHANNELS_ENV) {
            self.configure_from_str(&channels);
        }
    }

    pub fn enable(&mut self, channel: AuditChannel) {
        self.channels.insert(channel);
    }

    pub fn disable(&mut self, channel: AuditChannel) {
        self.channels.remove(&channel);
    }

    pub fn enable_all(&mut self) {
        self.channels.extend(AuditChannel::ALL);
    }

    pub fn disable_all(&mut self) {
        self.channels.clear();
    }

    pub fn is_enabled(&self, channel: AuditChannel) -> bool {
        self.channels.contains(&channel)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            console: ConsoleTarget::default(),
            webhook: None,
            email: None,
            database: None,
        }
    }
}

/// Console channel output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Webhook (Slack incoming-webhook compatible) settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint URL
    pub url: String,

    /// Message text template
    #[serde(default = "default_webhook_message")]
    pub message: MessageTemplate,

    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub icon_emoji: Option<String>,

    #[serde(default)]
    pub icon_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// SMTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Credentials are used only when `username` is set
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    pub from: String,

    pub to: Vec<String>,
}

/// SQLite settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Template for the `message` column
    #[serde(default)]
    pub message: MessageTemplate,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            message: MessageTemplate::default(),
        }
    }
}

fn default_channels() -> BTreeSet<AuditChannel> {
    BTreeSet::from([AuditChannel::Console])
}

fn default_webhook_message() -> MessageTemplate {
    MessageTemplate::new("[AUDIT] `${field}` changed: `${before}` -> `${after}`")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_smtp_port() -> u16 {
    25
}

fn default_database_path() -> PathBuf {
    PathBuf::from("fieldguard-audit.db")
}

/// Build a composite over every enabled channel.
///
/// A channel that is missing its settings or fails to initialize is logged
/// and left out, so one broken channel never disables the others.
pub fn build_composite_sink(config: &AuditConfig) -> CompositeSink {
    let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();

    for channel in AuditChannel::ALL {
        if !config.is_enabled(channel) {
            continue;
        }

        match build_channel(channel, config) {
            Ok(sink) => sinks.push(sink),
            Err(e) => warn!(channel = %channel, error = %e, "skipping audit channel"),
        }
    }

    info!(sinks = sinks.len(), "Audit sinks initialized");
    CompositeSink::new(sinks)
}

fn build_channel(channel: AuditChannel, config: &AuditConfig) -> Result<Arc<dyn AuditSink>> {
    let sink: Arc<dyn AuditSink> = match channel {
        AuditChannel::Console => match config.console {
            ConsoleTarget::Stdout => Arc::new(ConsoleSink::stdout()),
            ConsoleTarget::Stderr => Arc::new(ConsoleSink::stderr()),
        },
        AuditChannel::Webhook => {
            let settings = config
                .webhook
                .as_ref()
                .ok_or_else(|| Error::config("webhook channel enabled without a webhook section"))?;
            Arc::new(WebhookSink::new(settings.clone())?)
        }
        AuditChannel::Email => {
            let settings = config
                .email
                .as_ref()
                .ok_or_else(|| Error::config("email channel enabled without an email section"))?;
            Arc::new(EmailSink::smtp(settings)?)
        }
        AuditChannel::Database => {
            let settings = config.database.clone().unwrap_or_default();
            Arc::new(DatabaseSink::open(&settings.path, settings.message)?)
        }
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_console_only() {
        let config = AuditConfig::default();
        assert_eq!(config.channels, BTreeSet::from([AuditChannel::Console]));
    }

    #[test]
    fn test_configure_from_str() {
        let mut config = AuditConfig::default();
        config.configure_from_str(" slack, Database ,carrier-pigeon");

        assert!(config.is_enabled(AuditChannel::Webhook));
        assert!(config.is_enabled(AuditChannel::Database));
        assert!(!config.is_enabled(AuditChannel::Console));
        assert_eq!(config.channels.len(), 2);

        config.configure_from_str("   ");
        assert_eq!(config.channels.len(), 2);
    }

    #[test]
    fn test_enable_disable() {
        let mut config = AuditConfig::default();
        config.enable_all();
        assert_eq!(config.channels.len(), 4);

        config.disable(AuditChannel::Email);
        assert!(!config.is_enabled(AuditChannel::Email));

        config.disable_all();
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = r##"
channels: [console, webhook]
webhook:
  url: https://hooks.slack.com/services/T000/B000/XXXX
  channel: "#audit"
"##;
        let config = AuditConfig::from_yaml_str(yaml).unwrap();
        let webhook = config.webhook.unwrap();

        assert_eq!(webhook.timeout_secs, 10);
        assert_eq!(webhook.channel.as_deref(), Some("#audit"));
        assert_eq!(webhook.username, None);
        assert!(webhook.message.as_str().contains("${field}"));
    }

    #[test]
    fn test_missing_section_skips_channel() {
        let mut config = AuditConfig::default();
        config.configure_from_str("console,email");

        let composite = build_composite_sink(&config);
        assert_eq!(composite.sink_names(), vec!["console"]);
    }

    #[test]
    fn test_database_channel_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            "channels: [database]\ndatabase:\n  path: {}\n  message: \"${{field}} changed\"\n",
            dir.path().join("audit.db").display()
        );
        let config = AuditConfig::from_yaml_str(&yaml).unwrap();

        let composite = build_composite_sink(&config);
        assert_eq!(composite.sink_names(), vec!["database"]);
    }

    #[test]
    fn test_slack_alias_in_yaml() {
        let config = AuditConfig::from_yaml_str("channels: [slack]\n").unwrap();
        assert_eq!(config.channels, BTreeSet::from([AuditChannel::Webhook]));
    }

    #[test]
    fn test_apply_env_overrides_channels() {
        std::env::set_var(CHANNELS_ENV, "DATABASE,webhook");
        let mut config = AuditConfig::default();
        config.apply_env();
        std::env::remove_var(CHANNELS_ENV);

        assert_eq!(
            config.channels,
            BTreeSet::from([AuditChannel::Webhook, AuditChannel::Database])
        );
    }
}

