//! SQLite Storage Implementation
//!
//! Card store backed by SQLite with separate reader/writer connections.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::card::{Card, ReviewOutcome};
use crate::fsrs::CardState;
use crate::storage::CardStore;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Card not found
    #[error("Card not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed card store.
///
/// Uses separate reader/writer connections for interior mutability. All
/// methods take `&self`, making the store `Send + Sync` so sessions can
/// share an `Arc<SqliteCardStore>` without an outer lock.
pub struct SqliteCardStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl SqliteCardStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Create a new store instance.
    ///
    /// With no path, the database lands in the platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "glossa", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("glossa.db")
            }
        };

        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;
        let due: String = row.get("due")?;

        Ok(Card {
            id: row.get("id")?,
            learner_id: row.get("learner_id")?,
            content_id: row.get("content_id")?,
            term: row.get("term")?,
            state: CardState {
                stability: row.get("stability")?,
                difficulty: row.get("difficulty")?,
                due: parse_timestamp(&due)?,
                reps: row.get("reps")?,
                lapses: row.get("lapses")?,
            },
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

impl CardStore for SqliteCardStore {
    fn load_card(&self, learner_id: &str, content_id: &str) -> Result<Option<Card>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader
            .prepare("SELECT * FROM cards WHERE learner_id = ?1 AND content_id = ?2")?;
        let mut rows = stmt.query_map(params![learner_id, content_id], Self::row_to_card)?;
        rows.next().transpose().map_err(StorageError::from)
    }

    fn get_card(&self, card_id: &str) -> Result<Option<Card>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare("SELECT * FROM cards WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![card_id], Self::row_to_card)?;
        rows.next().transpose().map_err(StorageError::from)
    }

    fn save_card(&self, card: &Card) -> Result<()> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO cards
                (id, learner_id, content_id, term,
                 stability, difficulty, due, reps, lapses,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                term = excluded.term,
                stability = excluded.stability,
                difficulty = excluded.difficulty,
                due = excluded.due,
                reps = excluded.reps,
                lapses = excluded.lapses,
                updated_at = excluded.updated_at",
            params![
                card.id,
                card.learner_id,
                card.content_id,
                card.term,
                card.state.stability,
                card.state.difficulty,
                card.state.due.to_rfc3339(),
                card.state.reps,
                card.state.lapses,
                card.created_at.to_rfc3339(),
                card.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn due_cards(&self, learner_id: &str, now: DateTime<Utc>, limit: usize) -> Result<Vec<Card>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM cards
             WHERE learner_id = ?1 AND reps > 0 AND due <= ?2
             ORDER BY due ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![learner_id, now.to_rfc3339(), limit as i64],
            Self::row_to_card,
        )?;

        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(cards)
    }

    fn new_cards(&self, learner_id: &str, limit: usize) -> Result<Vec<Card>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM cards
             WHERE learner_id = ?1 AND reps = 0 AND lapses = 0
             ORDER BY created_at ASC, id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![learner_id, limit as i64], Self::row_to_card)?;

        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(cards)
    }

    fn append_review_log(&self, outcome: &ReviewOutcome) -> Result<()> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO review_log
                (id, card_id, learner_id, exercise_kind, rating, grade, time_ms,
                 stability_before, stability_after, difficulty_before, difficulty_after,
                 interval_days, retrievability, reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                outcome.id,
                outcome.card_id,
                outcome.learner_id,
                outcome.exercise_kind.as_str(),
                outcome.rating,
                outcome.grade,
                outcome.time_ms,
                outcome.stability_before,
                outcome.stability_after,
                outcome.difficulty_before,
                outcome.difficulty_after,
                outcome.interval_days,
                outcome.retrievability,
                outcome.reviewed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl SqliteCardStore {
    /// Number of review-log rows for a learner (summary/statistics support)
    pub fn review_count(&self, learner_id: &str) -> Result<i64> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let count = reader.query_row(
            "SELECT COUNT(*) FROM review_log WHERE learner_id = ?1",
            params![learner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ============================================================================
// TESTS
// ============================================================================
