//! SQLite store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use time::Date;
use tracing::{debug, info};

use stepquest_types::{DailySteps, YearlyGoal, format_date, parse_date};

use crate::error::{Error, Result};
use crate::schema;
use crate::traits::{GoalPreferences, StepStore};

const YEARLY_GOAL_KEY: &str = "yearly_goal";

/// SQLite-based store for daily step counts and preferences.
///
/// The connection sits behind a mutex, so a single `Store` can be shared
/// between the live poller, the history sync and the import path.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written,
        // so a poisoned mutex is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Oldest and newest stored dates, if any.
    pub fn date_span(&self) -> Result<Option<(Date, Date)>> {
        let conn = self.conn();
        let span: (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(date), MAX(date) FROM daily_steps",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        match span {
            (Some(first), Some(last)) => Ok(Some((decode_date(&first)?, decode_date(&last)?))),
            _ => Ok(None),
        }
    }
}

fn decode_date(s: &str) -> Result<Date> {
    parse_date(s).map_err(|_| Error::InvalidDate(s.to_string()))
}

fn decode_steps(date: &str, steps: i64) -> Result<u64> {
    u64::try_from(steps).map_err(|_| Error::InvalidValue {
        key: date.to_string(),
        value: steps.to_string(),
    })
}

fn encode_steps(record: &DailySteps) -> Result<i64> {
    i64::try_from(record.steps).map_err(|_| Error::InvalidValue {
        key: format_date(record.date),
        value: record.steps.to_string(),
    })
}

fn decode_row(date: String, steps: i64) -> Result<DailySteps> {
    let steps = decode_steps(&date, steps)?;
    Ok(DailySteps::new(decode_date(&date)?, steps))
}

impl StepStore for Store {
    fn get(&self, date: Date) -> Result<Option<DailySteps>> {
        let conn = self.conn();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT date, steps FROM daily_steps WHERE date = ?",
                [format_date(date)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(d, s)| decode_row(d, s)).transpose()
    }

    fn all(&self) -> Result<Vec<DailySteps>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT date, steps FROM daily_steps ORDER BY date DESC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(|(d, s)| decode_row(d, s)).collect()
    }

    fn sum_range(&self, start: Date, end: Date) -> Result<u64> {
        if start > end {
            return Ok(0);
        }

        let conn = self.conn();
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(steps), 0) FROM daily_steps WHERE date >= ?1 AND date <= ?2",
            [format_date(start), format_date(end)],
            |row| row.get(0),
        )?;

        decode_steps(&format!("{}..{}", format_date(start), format_date(end)), total)
    }

    fn upsert(&self, record: DailySteps) -> Result<()> {
        let steps = encode_steps(&record)?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO daily_steps (date, steps) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET steps = excluded.steps",
            rusqlite::params![format_date(record.date), steps],
        )?;
        Ok(())
    }

    fn upsert_many(&self, records: &[DailySteps]) -> Result<usize> {
        let encoded = records
            .iter()
            .map(|r| Ok((format_date(r.date), encode_steps(r)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO daily_steps (date, steps) VALUES (?1, ?2)
                 ON CONFLICT(date) DO UPDATE SET steps = excluded.steps",
            )?;
            for (date, steps) in &encoded {
                stmt.execute(rusqlite::params![date, steps])?;
            }
        }
        tx.commit()?;

        debug!("Upserted {} daily records", encoded.len());
        Ok(encoded.len())
    }

    fn count(&self) -> Result<u64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM daily_steps", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn upsert_if_vacant(&self, record: DailySteps) -> Result<bool> {
        let steps = encode_steps(&record)?;
        let conn = self.conn();
        let changed = conn.execute(
            "INSERT INTO daily_steps (date, steps) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET steps = excluded.steps
             WHERE daily_steps.steps = 0",
            rusqlite::params![format_date(record.date), steps],
        )?;
        Ok(changed > 0)
    }
}

impl GoalPreferences for Store {
    fn yearly_goal(&self) -> Result<YearlyGoal> {
        let conn = self.conn();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                [YEARLY_GOAL_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Ok(YearlyGoal::default()),
            Some(v) => v.parse().map_err(|_| Error::InvalidValue {
                key: YEARLY_GOAL_KEY.to_string(),
                value: v,
            }),
        }
    }

    fn set_yearly_goal(&self, goal: YearlyGoal) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![YEARLY_GOAL_KEY, goal.get().to_string()],
        )?;
        info!("Yearly goal set to {}", goal);
        Ok(())
    }
}
