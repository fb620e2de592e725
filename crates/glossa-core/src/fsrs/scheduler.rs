//! FSRS Scheduler
//!
//! Stateful wrapper over the pure algorithm functions. Holds the weight
//! vector and target retention, and turns ratings into new card states and
//! review intervals. The scheduler itself is immutable after construction
//! and safe to share across threads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    initial_difficulty, initial_stability, next_difficulty, next_forget_stability,
    next_recall_stability, retrievability, stability_to_interval, DEFAULT_RETENTION, FSRS_WEIGHTS,
    MIN_STABILITY,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Memory-model error type
#[derive(Debug, thiserror::Error)]
pub enum FsrsError {
    /// A state field reached the scheduler as NaN or infinity
    #[error("non-finite {field} in card state: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

// ============================================================================
// RATING
// ============================================================================

/// Review outcome rating, as supplied by the learner or inferred by
/// assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    /// Failed to recall (lapse)
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled correctly
    Good = 3,
    /// Recalled effortlessly
    Easy = 4,
}

impl Rating {
    /// Parse a 1-4 integer rating
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Parse an integer rating, clamping out-of-range values into 1..=4
    pub fn clamping(value: i32) -> Self {
        match value {
            i32::MIN..=1 => Rating::Again,
            2 => Rating::Hard,
            3 => Rating::Good,
            _ => Rating::Easy,
        }
    }

    /// Integer representation (1..=4)
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// True for Hard/Good/Easy (anything but a lapse)
    pub fn is_success(self) -> bool {
        !matches!(self, Rating::Again)
    }

    /// Human-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Rating {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        Rating::from_i32(value)
            .ok_or_else(|| serde::de::Error::custom(format!("rating out of range: {}", value)))
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Scheduler configuration: weight vector plus target retention.
///
/// Replaceable without changing the algorithm shape; optimized weights from
/// real review logs can be dropped in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsrsParameters {
    /// FSRS weight vector (w0..w12)
    pub weights: [f64; 13],
    /// Target recall probability at review time, in (0, 1)
    pub target_retention: f64,
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            weights: FSRS_WEIGHTS,
            target_retention: DEFAULT_RETENTION,
        }
    }
}

// ============================================================================
// CARD STATE
// ============================================================================

/// The scheduling state of one card: what the memory model reads and
/// replaces wholesale on every review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    /// Days until recall probability decays to the target retention
    pub stability: f64,
    /// Inherent item difficulty, bounded to [0.01, 0.99]
    pub difficulty: f64,
    /// When the card next becomes eligible for review (UTC)
    pub due: DateTime<Utc>,
    /// Successful reviews since the card was learned
    pub reps: i32,
    /// Times the card was forgotten (rated Again)
    pub lapses: i32,
}

impl CardState {
    /// Neutral state assigned when content is first given to a learner,
    /// before any review has happened.
    pub fn assigned(now: DateTime<Utc>) -> Self {
        Self {
            stability: 0.5,
            difficulty: 0.3,
            due: now,
            reps: 0,
            lapses: 0,
        }
    }

    /// True if the card has never been reviewed
    pub fn is_new(&self) -> bool {
        self.reps == 0 && self.lapses == 0
    }
}

/// The result of applying one review to a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// The replacement card state
    pub new_state: CardState,
    /// Scheduled interval until the next review, in days
    pub interval_days: f64,
    /// Estimated recall probability at the moment of review
    pub retrievability: f64,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Free Spaced Repetition Scheduler.
///
/// Pure and stateless with respect to cards: both operations read their
/// inputs and return new values, so a single scheduler can serve every
/// learner concurrently.
#[derive(Debug, Clone, Default)]
pub struct FsrsScheduler {
    params: FsrsParameters,
}

impl FsrsScheduler {
    /// Create a scheduler with explicit parameters
    pub fn new(params: FsrsParameters) -> Self {
        Self { params }
    }

    /// Create a scheduler with default weights and a custom target retention
    pub fn with_target_retention(target_retention: f64) -> Self {
        Self {
            params: FsrsParameters {
                target_retention,
                ..FsrsParameters::default()
            },
        }
    }

    /// The configured parameters
    pub fn params(&self) -> &FsrsParameters {
        &self.params
    }

    /// State for a card after its first-ever review.
    ///
    /// Stability comes from the per-rating lookup table w0..w3; a first
    /// "Again" counts as a lapse with zero successful reps.
    pub fn initial_state(&self, rating: Rating, now: DateTime<Utc>) -> CardState {
        let w = &self.params.weights;
        let stability = initial_stability(rating.as_i32(), w);
        let difficulty = initial_difficulty(rating.as_i32(), w);
        let interval = stability_to_interval(stability, self.params.target_retention);

        let (reps, lapses) = if rating == Rating::Again { (0, 1) } else { (1, 0) };

        CardState {
            stability,
            difficulty,
            due: now + days(interval),
            reps,
            lapses,
        }
    }

    /// Apply a review rating and compute the replacement state.
    ///
    /// `review_time` may be before or after the card's due time; elapsed
    /// time is measured from the previous review (the time since due plus
    /// the interval that was originally scheduled), so early and very
    /// overdue reviews are both handled.
    pub fn review(
        &self,
        state: &CardState,
        rating: Rating,
        review_time: DateTime<Utc>,
    ) -> Result<ReviewResult, FsrsError> {
        validate_finite("stability", state.stability)?;
        validate_finite("difficulty", state.difficulty)?;

        let w = &self.params.weights;
        let retention = self.params.target_retention;

        let seconds_since_due = (review_time - state.due).num_milliseconds() as f64 / 1_000.0;
        let scheduled = stability_to_interval(state.stability, retention);
        let elapsed_days = seconds_since_due / 86_400.0 + scheduled;
        let retrievability = retrievability(elapsed_days, state.stability);

        let new_difficulty = next_difficulty(state.difficulty, rating.as_i32(), w);

        let (new_stability, new_reps, new_lapses) = if rating == Rating::Again {
            (
                next_forget_stability(state.stability, new_difficulty, w),
                state.reps,
                state.lapses + 1,
            )
        } else {
            (
                next_recall_stability(state.stability, new_difficulty, retrievability, w),
                state.reps + 1,
                state.lapses,
            )
        };

        let new_stability = new_stability.max(MIN_STABILITY);

        let mut interval = stability_to_interval(new_stability, retention);
        match rating {
            Rating::Hard => interval *= 0.8,
            Rating::Easy => interval *= 1.3,
            _ => {}
        }
        let interval = interval.max(1.0);

        let new_state = CardState {
            stability: new_stability,
            difficulty: new_difficulty,
            due: review_time + days(interval),
            reps: new_reps,
            lapses: new_lapses,
        };

        Ok(ReviewResult {
            new_state,
            interval_days: interval,
            retrievability,
        })
    }
}

/// Fractional-day duration (millisecond precision)
fn days(days: f64) -> Duration {
    Duration::milliseconds((days * 86_400_000.0) as i64)
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), FsrsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FsrsError::NonFinite { field, value })
    }
}

// ============================================================================
// TESTS
// ============================================================================
