//! Audit message templates

use fieldguard_core::AuditEvent;
use serde::{Deserialize, Serialize};

/// Template used when none is configured
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "field=${field}, before=${before}, after=${after}";

/// Rendered for a missing value
const NULL: &str = "null";

/// Message template with `${field}`, `${before}` and `${after}` placeholders.
///
/// Placeholders are substituted in one pass, so a value containing `${...}`
/// is copied verbatim. Unknown placeholders are left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Create a new template
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the template for an event
    pub fn render(&self, event: &AuditEvent) -> String {
        let mut out = String::with_capacity(self.0.len() + 32);
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let tail = &rest[start + 2..];

            let Some(end) = tail.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = &tail[..end];
            match placeholder(key, event) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + end + 3]),
            }
            rest = &tail[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TEMPLATE)
    }
}

fn placeholder<'a>(key: &str, event: &'a AuditEvent) -> Option<&'a str> {
    match key {
        "field" => Some(event.field.as_str()),
        "before" => Some(event.before.as_deref().unwrap_or(NULL)),
        "after" => Some(event.after.as_deref().unwrap_or(NULL)),
        _ => None,
    }
}
