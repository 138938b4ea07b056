//! Email audit sink

use crate::config::EmailConfig;
use fieldguard_core::{AuditEvent, AuditSink, Error, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

/// Sends one plain-text message per event through a mail transport
pub struct EmailSink<T = SmtpTransport> {
    transport: T,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailSink<SmtpTransport> {
    /// SMTP sink from configuration.
    ///
    /// The connection is plain SMTP, suitable for a local or internal relay.
    pub fn smtp(config: &EmailConfig) -> Result<Self> {
        let mut builder =
            SmtpTransport::builder_dangerous(config.smtp_host.as_str()).port(config.smtp_port);

        if let Some(username) = config.username.as_ref().filter(|u| !u.is_empty()) {
            let password = config.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }

        Self::new(builder.build(), &config.from, &config.to)
    }
}

impl<T: Transport> EmailSink<T> {
    /// Sink over any transport
    pub fn new(transport: T, from: &str, to: &[String]) -> Result<Self> {
        let from = parse_mailbox(from)?;
        let to = to
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>>>()?;

        if to.is_empty() {
            return Err(Error::config("email sink needs at least one recipient"));
        }

        Ok(Self { transport, from, to })
    }

    /// Build the message for an event
    pub fn message(&self, event: &AuditEvent) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(format!("[AUDIT] field={}", event.field))
            .header(ContentType::TEXT_PLAIN);

        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        let body = format!(
            "before: {}\nafter: {}",
            event.before.as_deref().unwrap_or("null"),
            event.after.as_deref().unwrap_or("null")
        );

        builder
            .body(body)
            .map_err(|e| Error::audit("email", format!("cannot build message: {}", e)))
    }
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.trim()
        .parse()
        .map_err(|e| Error::config(format!("invalid email address '{}': {}", addr, e)))
}

impl<T> std::fmt::Debug for EmailSink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSink")
            .field("from", &self.from.to_string())
            .field("recipients", &self.to.len())
            .finish_non_exhaustive()
    }
}

impl<T> AuditSink for EmailSink<T>
where
    T: Transport + Send + Sync,
    T::Error: std::fmt::Display,
{
    fn name(&self) -> &str {
        "email"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        let message = self.message(event)?;
        self.transport
            .send(&message)
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;

        debug!(field = %event.field, recipients = self.to.len(), "sent audit email");
        Ok(())
    }
}
