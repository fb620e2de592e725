//! Card - the per-(learner, content) scheduling record
//!
//! A card links one learner to one piece of learned content and carries the
//! FSRS state the scheduler reads and replaces on every review. The
//! append-only [`ReviewOutcome`] records what each review did to the card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exercise::ExerciseKind;
use crate::fsrs::CardState;

// ============================================================================
// CARD
// ============================================================================

/// A flashcard with FSRS scheduling state for a learner-content pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The learner this card belongs to
    pub learner_id: String,
    /// The content item this card schedules
    pub content_id: String,
    /// The term being learned (denormalized for session-level tracking)
    pub term: String,
    /// FSRS scheduling state, replaced wholesale on every review
    #[serde(flatten)]
    pub state: CardState,
    /// When the card was created
    pub created_at: DateTime<Utc>,
    /// When the card was last written
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a card at content-assignment time, with the neutral
    /// never-reviewed state and `due = now`.
    pub fn new(
        learner_id: impl Into<String>,
        content_id: impl Into<String>,
        term: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.into(),
            content_id: content_id.into(),
            term: term.into(),
            state: CardState::assigned(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the card has never been reviewed
    pub fn is_new(&self) -> bool {
        self.state.is_new()
    }

    /// True if the card is eligible for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state.reps > 0 && self.state.due <= now
    }
}

// ============================================================================
// REVIEW OUTCOME
// ============================================================================

/// Immutable audit record of one review event.
///
/// Created once per answer and appended to the review log; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The reviewed card
    pub card_id: String,
    /// The learner who reviewed
    pub learner_id: String,
    /// The exercise kind that was presented
    pub exercise_kind: ExerciseKind,
    /// The rating actually applied (1-4)
    pub rating: i32,
    /// Assessment grade name ("correct", "close", "partial", "incorrect")
    pub grade: String,
    /// Response time in milliseconds
    pub time_ms: i64,
    /// Stability before the review
    pub stability_before: f64,
    /// Stability after the review
    pub stability_after: f64,
    /// Difficulty before the review
    pub difficulty_before: f64,
    /// Difficulty after the review
    pub difficulty_after: f64,
    /// Scheduled interval in days
    pub interval_days: f64,
    /// Estimated recall probability at review time
    pub retrievability: f64,
    /// When the review happened
    pub reviewed_at: DateTime<Utc>,
}

// ============================================================================
// TESTS
// ============================================================================
