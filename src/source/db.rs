//! Read-only loader for the engine's SQLite run database.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use serde_json::Value;

use crate::event::Event;

/// Default number of events for [`DbQuery::Latest`].
pub const DEFAULT_LIMIT: usize = 100;

const EVENT_COLUMNS: &str = "event_id, timestamp, event_type, payload, run_id";

/// Which events to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbQuery {
    /// All events of one run.
    Run(String),
    /// All events of the most recently started run.
    LatestRun,
    /// Events whose timestamp falls in `[start, end]`.
    Range { start: String, end: String },
    /// The newest N events, oldest first.
    Latest(usize),
}

pub struct EventDb {
    conn: Connection,
}

impl EventDb {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open event database at {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Load events in ascending timestamp order.
    pub fn load(&self, query: &DbQuery) -> Result<Vec<Event>> {
        let events = match query {
            DbQuery::Run(run_id) => self.run_events(run_id)?,
            DbQuery::LatestRun => match self.latest_run_id()? {
                Some(run_id) => self.run_events(&run_id)?,
                None => {
                    tracing::info!("event database has no runs");
                    Vec::new()
                }
            },
            DbQuery::Range { start, end } => self.range_events(start, end)?,
            DbQuery::Latest(limit) => self.latest_events(*limit)?,
        };
        tracing::info!(count = events.len(), ?query, "loaded events from database");
        Ok(events)
    }

    pub fn latest_run_id(&self) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT run_id FROM runs ORDER BY start_time DESC LIMIT 1")
            .context("Failed to prepare latest run query")?;
        let mut rows = stmt.query([]).context("Failed to query latest run")?;
        match rows.next().context("Failed to read latest run")? {
            Some(row) => Ok(Some(row.get(0).context("Failed to read run_id")?)),
            None => Ok(None),
        }
    }

    pub fn run_events(&self, run_id: &str) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE run_id = ? ORDER BY timestamp ASC"
        );
        self.query_events(&sql, [run_id])
    }

    pub fn range_events(&self, start: &str, end: &str) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE timestamp BETWEEN ? AND ? ORDER BY timestamp ASC"
        );
        self.query_events(&sql, [start, end])
    }

    pub fn latest_events(&self, limit: usize) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY timestamp DESC LIMIT ?");
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut events = self.query_events(&sql, [limit])?;
        events.reverse();
        Ok(events)
    }

    fn query_events<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .context("Failed to prepare event query")?;
        let events = stmt
            .query_map(params, event_from_row)
            .context("Failed to query events")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read event rows")?;
        Ok(events)
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let payload = match column_text(row, 3)? {
        text if text.is_empty() => Value::Null,
        text => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    };
    Ok(Event::new(
        column_text(row, 0)?,
        column_text(row, 1)?,
        column_text(row, 2)?,
        column_text(row, 4)?,
        payload,
    ))
}

/// Read any column as text; SQLite columns are loosely typed.
fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE runs (run_id TEXT PRIMARY KEY, start_time TEXT);
            CREATE TABLE events (
                event_id TEXT PRIMARY KEY,
                timestamp TEXT,
                event_type TEXT,
                payload TEXT,
                run_id TEXT
            );
            INSERT INTO runs VALUES ('r1', '2025-04-14T09:00:00Z');
            INSERT INTO runs VALUES ('r2', '2025-04-14T11:00:00Z');
            INSERT INTO events VALUES ('e1', '2025-04-14T09:00:01Z', 'run_started', '{"mode":"live"}', 'r1');
            INSERT INTO events VALUES ('e2', '2025-04-14T09:00:02Z', 'llm_call_started', '{"model":"m"}', 'r1');
            INSERT INTO events VALUES ('e4', '2025-04-14T11:00:02Z', 'run_finished', 'plain text', 'r2');
            INSERT INTO events VALUES ('e3', '2025-04-14T11:00:01Z', 'run_started', NULL, 'r2');
            "#,
        )
        .unwrap();
        (dir, path)
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn loads_run_in_timestamp_order() {
        let (_dir, path) = fixture();
        let db = EventDb::open(&path).unwrap();
        let events = db.load(&DbQuery::Run("r2".to_string())).unwrap();
        assert_eq!(ids(&events), vec!["e3", "e4"]);
    }

    #[test]
    fn latest_run_uses_start_time() {
        let (_dir, path) = fixture();
        let db = EventDb::open(&path).unwrap();
        assert_eq!(db.latest_run_id().unwrap().as_deref(), Some("r2"));
        let events = db.load(&DbQuery::LatestRun).unwrap();
        assert!(events.iter().all(|e| e.run_id == "r2"));
    }

    #[test]
    fn latest_n_returns_oldest_first() {
        let (_dir, path) = fixture();
        let db = EventDb::open(&path).unwrap();
        let events = db.load(&DbQuery::Latest(3)).unwrap();
        assert_eq!(ids(&events), vec!["e2", "e3", "e4"]);
    }

    #[test]
    fn range_is_inclusive() {
        let (_dir, path) = fixture();
        let db = EventDb::open(&path).unwrap();
        let events = db
            .load(&DbQuery::Range {
                start: "2025-04-14T09:00:02Z".to_string(),
                end: "2025-04-14T11:00:01Z".to_string(),
            })
            .unwrap();
        assert_eq!(ids(&events), vec!["e2", "e3"]);
    }

    #[test]
    fn payload_text_that_is_not_json_becomes_string() {
        let (_dir, path) = fixture();
        let db = EventDb::open(&path).unwrap();
        let events = db.load(&DbQuery::Run("r2".to_string())).unwrap();
        assert_eq!(events[0].payload, Value::Null);
        assert_eq!(events[1].payload, Value::String("plain text".to_string()));
    }

    #[test]
    fn empty_database_has_no_latest_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE runs (run_id TEXT, start_time TEXT);
             CREATE TABLE events (event_id TEXT, timestamp TEXT, event_type TEXT, payload TEXT, run_id TEXT);",
        )
        .unwrap();
        drop(conn);
        let db = EventDb::open(&path).unwrap();
        assert!(db.load(&DbQuery::LatestRun).unwrap().is_empty());
    }

    #[test]
    fn missing_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        assert!(EventDb::open(&dir.path().join("nope.db")).is_err());
    }
}
