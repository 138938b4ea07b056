//! SQLite audit sink

use crate::template::MessageTemplate;
use fieldguard_core::{AuditEvent, AuditSink, Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS audit_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    field       TEXT NOT NULL,
    before_val  TEXT,
    after_val   TEXT,
    message     TEXT NOT NULL,
    evt_time    TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// One stored audit row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub id: i64,
    pub field: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub message: String,
    pub evt_time: String,
}

/// Appends one row per event to the `audit_log` table
pub struct DatabaseSink {
    conn: Mutex<Connection>,
    template: MessageTemplate,
}

impl DatabaseSink {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>, template: MessageTemplate) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::config(format!("cannot open audit database {}: {}", path.display(), e))
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| Error::config(format!("cannot configure audit database: {}", e)))?;

        let sink = Self::from_connection(conn, template)?;
        info!(path = %path.display(), "Opened audit database");
        Ok(sink)
    }

    /// Private in-memory database
    pub fn in_memory(template: MessageTemplate) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("cannot open in-memory database: {}", e)))?;
        Self::from_connection(conn, template)
    }

    /// Wrap an existing connection, creating the table if missing
    pub fn from_connection(conn: Connection, template: MessageTemplate) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::config(format!("cannot create audit_log table: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            template,
        })
    }

    /// Number of stored rows
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;
        Ok(count as usize)
    }

    /// Most recent rows, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<AuditRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, field, before_val, after_val, message, evt_time \
                 FROM audit_log ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(AuditRow {
                    id: row.get(0)?,
                    field: row.get(1)?,
                    before: row.get(2)?,
                    after: row.get(3)?,
                    message: row.get(4)?,
                    evt_time: row.get(5)?,
                })
            })
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;

        let rows = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::audit(self.name(), e.to_string()))?;
        Ok(rows)
    }
}

impl std::fmt::Debug for DatabaseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSink")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl AuditSink for DatabaseSink {
    fn name(&self) -> &str {
        "database"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        let message = self.template.render(event);
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO audit_log (field, before_val, after_val, message) VALUES (?1, ?2, ?3, ?4)",
            params![event.field, event.before, event.after, message],
        )
        .map_err(|e| Error::audit(self.name(), e.to_string()))?;

        debug!(field = %event.field, "stored audit row");
        Ok(())
    }
}
