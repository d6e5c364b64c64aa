// ## 📦 `src/sink/sqlite.rs`

//! SQLite upsert sink.
//!
//! Schema (created on open when missing):
//!
//! ```sql
//! CREATE TABLE vehicles (
//!     identifier TEXT PRIMARY KEY,
//!     make       TEXT,
//!     model      TEXT,
//!     color      TEXT,
//!     last_seen  TEXT NOT NULL
//! );
//! ```
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::sink::types::{RecordSink, SinkError, StoredVehicle, UpsertOutcome};
use crate::stream::extract::DecodedRecord;
use crate::types::ConfigError;

pub const CREATE_VEHICLES_SQL: &str = r#"CREATE TABLE IF NOT EXISTS vehicles (
    identifier TEXT PRIMARY KEY,
    make       TEXT,
    model      TEXT,
    color      TEXT,
    last_seen  TEXT NOT NULL
)"#;

const EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM vehicles WHERE identifier = ?1)";

const UPSERT_SQL: &str = r#"INSERT INTO vehicles (identifier, make, model, color, last_seen)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(identifier) DO UPDATE SET
    make = excluded.make,
    model = excluded.model,
    color = excluded.color,
    last_seen = excluded.last_seen"#;

const SELECT_SQL: &str =
    "SELECT identifier, make, model, color, last_seen FROM vehicles WHERE identifier = ?1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteSinkConfig {
    /// Width of the stored identifier column. Longer identifiers are cut to
    /// this many characters and a warning is logged.
    pub identifier_width: Option<usize>,
}

impl SqliteSinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identifier_width == Some(0) {
            return Err(ConfigError::IdentifierWidth);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
    config: SqliteSinkConfig,
}

impl SqliteSink {
    pub fn open(path: impl AsRef<Path>, config: SqliteSinkConfig) -> Result<Self, SinkError> {
        let conn = Connection::open(path.as_ref())?;
        debug!("[SINK] sqlite opened at {}", path.as_ref().display());
        Self::with_connection(conn, config)
    }

    pub fn open_in_memory(config: SqliteSinkConfig) -> Result<Self, SinkError> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    pub fn with_connection(conn: Connection, config: SqliteSinkConfig) -> Result<Self, SinkError> {
        config
            .validate()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_VEHICLES_SQL)?;
        Ok(Self { conn, config })
    }

    pub fn get(&self, identifier: &str) -> Result<Option<StoredVehicle>, SinkError> {
        let row = self
            .conn
            .query_row(SELECT_SQL, [identifier], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, Option<String>>(3)?,
                    r.get::<_, String>(4)?,
                ))
            })
            .optional()?;

        let Some((identifier, make, model, color, last_seen)) = row else {
            return Ok(None);
        };
        let last_seen = DateTime::parse_from_rfc3339(&last_seen)
            .map_err(|e| SinkError::Corrupt {
                identifier: identifier.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Some(StoredVehicle { identifier, make, model, color, last_seen }))
    }

    pub fn count(&self) -> Result<u64, SinkError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vehicles", [], |r| r.get(0))?;
        Ok(n.max(0) as u64)
    }

    fn reconcile_identifier<'a>(&self, identifier: &'a str) -> &'a str {
        match self.config.identifier_width {
            Some(width) if identifier.chars().count() > width => {
                let cut = identifier
                    .char_indices()
                    .nth(width)
                    .map_or(identifier.len(), |(i, _)| i);
                warn!(
                    "[SINK] identifier {:?} exceeds stored width {}, truncated to {:?}",
                    identifier, width, &identifier[..cut]
                );
                &identifier[..cut]
            }
            _ => identifier,
        }
    }
}

impl RecordSink for SqliteSink {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError> {
        let Some(identifier) = record.identifier.as_deref() else {
            debug!("[SINK] sqlite: record without identifier skipped");
            return Ok(UpsertOutcome::Skipped);
        };
        let identifier = self.reconcile_identifier(identifier);

        let tx = self.conn.transaction()?;
        let existed: bool = tx.query_row(EXISTS_SQL, [identifier], |r| r.get(0))?;
        tx.execute(
            UPSERT_SQL,
            params![
                identifier,
                record.make,
                record.model,
                record.color,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        Ok(if existed { UpsertOutcome::Updated } else { UpsertOutcome::Inserted })
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
