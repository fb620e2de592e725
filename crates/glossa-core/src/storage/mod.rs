//! Storage layer
//!
//! The [`CardStore`] trait is the persistence collaborator the engine
//! consumes: card load/save, due and new queries, and the append-only
//! review log. [`SqliteCardStore`] is the bundled implementation.

mod migrations;
mod sqlite;

pub use sqlite::{Result, SqliteCardStore, StorageError};

use chrono::{DateTime, Utc};

use crate::card::{Card, ReviewOutcome};

/// Persistence collaborator.
///
/// Calls are synchronous from the engine's perspective and may fail with a
/// transient I/O error, which the engine propagates without retrying.
/// `save_card` replaces the whole record, so readers never observe a
/// partially-updated card.
pub trait CardStore: Send + Sync {
    /// Load a card by learner and content pair
    fn load_card(&self, learner_id: &str, content_id: &str) -> Result<Option<Card>>;

    /// Load a card by id
    fn get_card(&self, card_id: &str) -> Result<Option<Card>>;

    /// Insert or replace a card (whole-record write)
    fn save_card(&self, card: &Card) -> Result<()>;

    /// Cards with `reps > 0` due at or before `now`, most overdue first
    fn due_cards(&self, learner_id: &str, now: DateTime<Utc>, limit: usize) -> Result<Vec<Card>>;

    /// Never-reviewed cards (`reps == 0 && lapses == 0`) in creation order
    fn new_cards(&self, learner_id: &str, limit: usize) -> Result<Vec<Card>>;

    /// Append one review outcome to the audit log
    fn append_review_log(&self, outcome: &ReviewOutcome) -> Result<()>;
}
