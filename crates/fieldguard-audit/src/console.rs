//! Console audit sink

use fieldguard_core::{AuditEvent, AuditSink, Error, Result};
use parking_lot::Mutex;
use std::io::Write;

/// Writes one `[AUDIT]` line per event
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Sink writing to stderr
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    /// Sink writing to any writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Format an event as a single line
    pub fn format(event: &AuditEvent) -> String {
        format!(
            "[AUDIT] field={}, before={}, after={}",
            event.field,
            quoted(event.before.as_deref()),
            quoted(event.after.as_deref())
        )
    }
}

// Escaped so quotes and newlines in a value keep the event on one line
fn quoted(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "null".to_string(),
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl AuditSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        let line = Self::format(event);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::audit(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_line_format() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::new(buffer.clone());

        sink.handle(&AuditEvent::new(
            "email",
            Some("user@example.com".to_string()),
            Some("u**r@example.com".to_string()),
        ))
        .unwrap();
        sink.handle(&AuditEvent::new("phone", None, None)).unwrap();

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(
            output,
            "[AUDIT] field=email, before=\"user@example.com\", after=\"u**r@example.com\"\n\
             [AUDIT] field=phone, before=null, after=null\n"
        );
    }

    #[test]
    fn test_console_escapes_values() {
        let event = AuditEvent::new(
            "note",
            Some("say \"hi\"\nbye".to_string()),
            Some("홍길동".to_string()),
        );

        let line = ConsoleSink::format(&event);
        assert_eq!(
            line,
            "[AUDIT] field=note, before=\"say \\\"hi\\\"\\nbye\", after=\"홍길동\""
        );
        assert!(!line.contains('\n'));
    }
}
