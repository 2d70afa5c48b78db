use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result, Row};
use std::path::Path;
use time_humanize::{Accuracy, HumanTime, Tense};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RunKind {
    Quiz,
    Drill,
}

impl RunKind {
    fn as_str(&self) -> &'static str {
        match self {
            RunKind::Quiz => "quiz",
            RunKind::Drill => "drill",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "quiz" => Some(RunKind::Quiz),
            "drill" => Some(RunKind::Drill),
            _ => None,
        }
    }
}

/// One finished quiz or drill.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub kind: RunKind,
    /// Quiz category name or drill scenario title.
    pub title: String,
    pub score: u32,
    pub max_score: u32,
    pub percent: f64,
    pub completed_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub runs: u32,
    pub best_percent: Option<f64>,
    pub average_percent: Option<f64>,
}

/// Run history backed by SQLite
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open (creating if needed) the history database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS run_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                score INTEGER NOT NULL,
                max_score INTEGER NOT NULL,
                percent REAL NOT NULL,
                completed_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_run_history_kind ON run_history(kind, title)",
            [],
        )?;
        Ok(HistoryDb { conn })
    }

    pub fn record(&self, run: &RunRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO run_history (kind, title, score, max_score, percent, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                run.kind.as_str(),
                run.title,
                run.score,
                run.max_score,
                run.percent,
                run.completed_at.to_rfc3339(),
            ],
        )?;
        debug!(kind = run.kind.as_str(), title = %run.title, percent = run.percent, "run recorded");
        Ok(())
    }

    /// Most recent runs first.
    pub fn recent(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT kind, title, score, max_score, percent, completed_at
            FROM run_history
            ORDER BY completed_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], row_to_record)?;
        rows.collect()
    }

    pub fn best_percent(&self, kind: RunKind, title: &str) -> Result<Option<f64>> {
        self.conn.query_row(
            "SELECT MAX(percent) FROM run_history WHERE kind = ?1 AND title = ?2",
            params![kind.as_str(), title],
            |row| row.get(0),
        )
    }

    pub fn summary(&self, kind: RunKind) -> Result<HistorySummary> {
        self.conn.query_row(
            "SELECT COUNT(*), MAX(percent), AVG(percent) FROM run_history WHERE kind = ?1",
            [kind.as_str()],
            |row| {
                Ok(HistorySummary {
                    runs: row.get(0)?,
                    best_percent: row.get(1)?,
                    average_percent: row.get(2)?,
                })
            },
        )
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM run_history", [])?;
        Ok(())
    }
}

fn row_to_record(row: &Row<'_>) -> Result<RunRecord> {
    let kind_str: String = row.get(0)?;
    let kind = RunKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(0, "kind".to_string(), rusqlite::types::Type::Text)
    })?;
    let completed_str: String = row.get(5)?;
    let completed_at = DateTime::parse_from_rfc3339(&completed_str)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                5,
                "completed_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&Local);

    Ok(RunRecord {
        kind,
        title: row.get(1)?,
        score: row.get(2)?,
        max_score: row.get(3)?,
        percent: row.get(4)?,
        completed_at,
    })
}

/// "3 hours ago" style label for a past timestamp.
pub fn humanize_since(then: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = (now - then).to_std().unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}
