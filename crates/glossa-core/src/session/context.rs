//! Session-scoped learner context
//!
//! Mutable aggregate of performance signals for one active session:
//! running accuracy counters, an append-only review event log, and the
//! terms the learner is struggling with. Owned exclusively by the session
//! and discarded when it ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assess::Grade;
use crate::exercise::ExerciseKind;
use crate::fsrs::Rating;

// ============================================================================
// REVIEW EVENT
// ============================================================================

/// One review event within the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    /// The reviewed card
    pub card_id: String,
    /// The term that was drilled
    pub term: String,
    /// The exercise kind presented
    pub exercise_kind: ExerciseKind,
    /// The rating applied
    pub rating: Rating,
    /// The assessment grade
    pub grade: Grade,
    /// Response time in milliseconds
    pub time_ms: i64,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// SESSION CONTEXT
// ============================================================================

/// Performance signals for one active session.
///
/// The event log is append-only and insertion order is meaningful (the
/// failure streak counts backward from the most recent event).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// The learner this context tracks
    pub learner_id: String,
    /// When the session started
    pub session_start: DateTime<Utc>,
    /// Ordered log of review events
    pub reviews: Vec<ReviewEvent>,
    /// Reviews graded exactly correct
    pub correct: usize,
    /// Reviews graded anything else
    pub incorrect: usize,
    /// Terms failed this session, in first-failure order, deduplicated
    pub struggling_terms: Vec<String>,
    /// Card ids rated Again this session
    pub recently_failed: Vec<String>,
}

impl SessionContext {
    /// Create an empty context for a learner
    pub fn new(learner_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            learner_id: learner_id.into(),
            session_start: now,
            reviews: Vec::new(),
            correct: 0,
            incorrect: 0,
            struggling_terms: Vec::new(),
            recently_failed: Vec::new(),
        }
    }

    /// Current session accuracy as a fraction; 1.0 before any review
    pub fn session_accuracy(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            1.0
        } else {
            self.correct as f64 / total as f64
        }
    }

    /// Number of reviews recorded this session
    pub fn session_count(&self) -> usize {
        self.reviews.len()
    }

    /// Record a review event and update running signals
    pub fn record_review(&mut self, event: ReviewEvent) {
        if event.grade == Grade::Correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
            if event.rating == Rating::Again {
                self.recently_failed.push(event.card_id.clone());
                if !self.struggling_terms.contains(&event.term) {
                    self.struggling_terms.push(event.term.clone());
                }
            }
        }
        self.reviews.push(event);
    }

    /// The last `n` review events
    pub fn recent_reviews(&self, n: usize) -> &[ReviewEvent] {
        let start = self.reviews.len().saturating_sub(n);
        &self.reviews[start..]
    }

    /// Consecutive non-correct reviews counting back from the most recent;
    /// resets to zero at the first correct answer encountered.
    pub fn failure_streak(&self) -> usize {
        self.reviews
            .iter()
            .rev()
            .take_while(|event| event.grade != Grade::Correct)
            .count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
