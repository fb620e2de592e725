//! Database Migrations
//!
//! Schema migration definitions for the card store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: cards and review log",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Review-log query indexes",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL
);
INSERT INTO schema_version (version, applied_at)
SELECT 0, datetime('now')
WHERE NOT EXISTS (SELECT 1 FROM schema_version);

CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    learner_id TEXT NOT NULL,
    content_id TEXT NOT NULL,
    term TEXT NOT NULL DEFAULT '',

    -- FSRS state
    stability REAL NOT NULL DEFAULT 0.5,
    difficulty REAL NOT NULL DEFAULT 0.3,
    due TEXT NOT NULL,
    reps INTEGER NOT NULL DEFAULT 0,
    lapses INTEGER NOT NULL DEFAULT 0,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    UNIQUE (learner_id, content_id)
);

CREATE INDEX IF NOT EXISTS idx_cards_learner_due ON cards(learner_id, due);
CREATE INDEX IF NOT EXISTS idx_cards_learner_reps ON cards(learner_id, reps);

-- Append-only audit log of review outcomes
CREATE TABLE IF NOT EXISTS review_log (
    id TEXT PRIMARY KEY,
    card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    learner_id TEXT NOT NULL,
    exercise_kind TEXT NOT NULL,
    rating INTEGER NOT NULL,
    grade TEXT NOT NULL,
    time_ms INTEGER NOT NULL,
    stability_before REAL NOT NULL,
    stability_after REAL NOT NULL,
    difficulty_before REAL NOT NULL,
    difficulty_after REAL NOT NULL,
    interval_days REAL NOT NULL,
    retrievability REAL NOT NULL,
    reviewed_at TEXT NOT NULL
);

UPDATE schema_version SET version = 1, applied_at = datetime('now');
"#;

/// V2: Indexes for per-card and per-learner log queries
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_review_log_card ON review_log(card_id);
CREATE INDEX IF NOT EXISTS idx_review_log_learner_time ON review_log(learner_id, reviewed_at);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
