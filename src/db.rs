use crate::error::{Result, ScraperError};
use crate::types::{Concert, Venue};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::storage::Storage;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Uniqueness over (headliner, date, time) is enforced by the application's
// existence check, not by a database constraint.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS venue (
    id       TEXT PRIMARY KEY,
    name     TEXT NOT NULL UNIQUE,
    location TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS concert (
    id         TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    date       TEXT NOT NULL,
    time       TEXT,
    url        TEXT,
    headliner  TEXT NOT NULL,
    supports   TEXT,
    age        TEXT,
    cost       TEXT,
    venue_id   TEXT NOT NULL REFERENCES venue(id)
);
"#;

/// SQLite-backed concert store.
///
/// Every insert commits on its own (autocommit), which is the pipeline's
/// per-record commit policy: a failure late in a batch keeps the rows that
/// were inserted before it.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| ScraperError::Storage {
        message: format!("invalid uuid {text:?}: {e}"),
    })
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| ScraperError::Storage {
        message: format!("invalid stored date {text:?}: {e}"),
    })
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ScraperError::Storage {
            message: format!("invalid stored timestamp {text:?}: {e}"),
        })
}

type ConcertRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn row_to_concert(row: ConcertRow) -> Result<Concert> {
    let (id, created_at, date, time, url, headliner, supports, age, cost, venue_id) = row;
    Ok(Concert {
        id: Some(parse_uuid(&id)?),
        created_at: parse_timestamp(&created_at)?,
        date: parse_date(&date)?,
        time,
        url,
        headliner,
        supports,
        age,
        cost,
        venue_id: parse_uuid(&venue_id)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_venue(&self, venue: &mut Venue) -> Result<()> {
        let id = Uuid::new_v4();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO venue (id, name, location) VALUES (?1, ?2, ?3)",
            params![id.to_string(), venue.name, venue.location],
        )?;
        venue.id = Some(id);

        debug!("Created venue: {} with id {}", venue.name, id);
        Ok(())
    }

    async fn get_venue_by_name(&self, name: &str) -> Result<Option<Venue>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, name, location FROM venue WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, name, location)) => Ok(Some(Venue {
                id: Some(parse_uuid(&id)?),
                name,
                location,
            })),
            None => Ok(None),
        }
    }

    async fn create_concert(&self, concert: &mut Concert) -> Result<()> {
        let id = Uuid::new_v4();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO concert (id, created_at, date, time, url, headliner, supports, age, cost, venue_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id.to_string(),
                concert.created_at.to_rfc3339(),
                concert.date.format(DATE_FORMAT).to_string(),
                concert.time,
                concert.url,
                concert.headliner,
                concert.supports,
                concert.age,
                concert.cost,
                concert.venue_id.to_string(),
            ],
        )?;
        concert.id = Some(id);

        debug!("Created concert: {} with id {}", concert.headliner, id);
        Ok(())
    }

    async fn find_concert(
        &self,
        headliner: &str,
        date: NaiveDate,
        time: Option<&str>,
    ) -> Result<Option<Concert>> {
        let conn = self.conn.lock().unwrap();
        // `IS` instead of `=` so an absent time matches only an absent time
        let row = conn
            .query_row(
                "SELECT id, created_at, date, time, url, headliner, supports, age, cost, venue_id
                 FROM concert WHERE headliner = ?1 AND date = ?2 AND time IS ?3",
                params![headliner, date.format(DATE_FORMAT).to_string(), time],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, Option<String>>(7)?,
                        row.get::<_, Option<String>>(8)?,
                        row.get::<_, String>(9)?,
                    ))
                },
            )
            .optional()?;

        row.map(row_to_concert).transpose()
    }

    async fn concert_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM concert", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
