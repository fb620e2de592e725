//! Review queue construction
//!
//! Selects a bounded working set of due and new cards for one session and
//! merges them into a single presentation order. Built fresh at session
//! start and never persisted; later-arriving due cards wait for the next
//! session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::config::EngineConfig;
use crate::storage::{CardStore, Result};

// ============================================================================
// CONFIG
// ============================================================================

/// Limits for one queue build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Maximum due cards fetched
    pub max_reviews: usize,
    /// Maximum new cards fetched (before the ratio cap)
    pub max_new: usize,
    /// New cards per due review (0.25 = one new card per four reviews)
    pub new_card_ratio: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            max_reviews: config.max_reviews_per_session,
            max_new: config.max_new_cards_per_session,
            new_card_ratio: config.new_card_ratio,
        }
    }
}

// ============================================================================
// QUEUE
// ============================================================================

/// A prepared queue of cards for one review session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueue {
    /// Due cards, most overdue first
    pub due_cards: Vec<Card>,
    /// Never-reviewed cards in creation order
    pub new_cards: Vec<Card>,
    /// Total card count
    pub total: usize,
}

impl ReviewQueue {
    /// Build a queue from already-fetched card lists
    pub fn new(due_cards: Vec<Card>, new_cards: Vec<Card>) -> Self {
        let total = due_cards.len() + new_cards.len();
        Self {
            due_cards,
            new_cards,
            total,
        }
    }

    /// Merge due and new cards into one presentation order.
    ///
    /// Walks the due list in order and emits one new card after every
    /// `max(1, due / (new + 1))`-th due card until new cards run out;
    /// leftovers are appended at the end. Deterministic for fixed inputs -
    /// new material is spread through the session without front- or
    /// back-loading it.
    pub fn interleaved(&self) -> Vec<Card> {
        if self.new_cards.is_empty() {
            return self.due_cards.clone();
        }
        if self.due_cards.is_empty() {
            return self.new_cards.clone();
        }

        let interval = (self.due_cards.len() / (self.new_cards.len() + 1)).max(1);
        let mut result = Vec::with_capacity(self.total);
        let mut new_iter = self.new_cards.iter();
        let mut pending = new_iter.next();

        for (i, card) in self.due_cards.iter().enumerate() {
            result.push(card.clone());
            if pending.is_some() && (i + 1) % interval == 0 {
                if let Some(new_card) = pending.take() {
                    result.push(new_card.clone());
                    pending = new_iter.next();
                }
            }
        }

        // Append any remaining new cards at the end
        if let Some(new_card) = pending {
            result.push(new_card.clone());
        }
        result.extend(new_iter.cloned());
        result
    }
}

// ============================================================================
// BUILD
// ============================================================================

/// Build a review queue for a learner at a point in time.
///
/// Due cards are fetched most-overdue-first up to `max_reviews`; the
/// new-card count is the smaller of `max_new` and one per
/// `1/new_card_ratio` due reviews (at least one slot, unless `max_new` is
/// zero), tying new-card introduction to available review volume.
pub fn build_queue(
    store: &dyn CardStore,
    learner_id: &str,
    config: &QueueConfig,
    now: DateTime<Utc>,
) -> Result<ReviewQueue> {
    let due_cards = store.due_cards(learner_id, now, config.max_reviews)?;

    let ratio_slots = ((due_cards.len() as f64 * config.new_card_ratio) as usize).max(1);
    let new_slots = config.max_new.min(ratio_slots);

    let new_cards = if new_slots > 0 {
        store.new_cards(learner_id, new_slots)?
    } else {
        Vec::new()
    };

    let queue = ReviewQueue::new(due_cards, new_cards);
    tracing::info!(
        learner_id,
        due = queue.due_cards.len(),
        new = queue.new_cards.len(),
        total = queue.total,
        "Built review queue"
    );
    Ok(queue)
}

// ============================================================================
// TESTS
// ============================================================================
