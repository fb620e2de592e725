//! FSRS (Free Spaced Repetition Scheduler) Module
//!
//! A simplified FSRS-4.5 scheduler built on the power forgetting curve.
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + t / (9 * S))^-1
//! - Interval: t = 9 * S * (1/retention - 1)
//!
//! Stability (S) is the number of days until recall probability decays to
//! the target retention; difficulty (D) is a bounded [0.01, 0.99] scalar
//! updated by mean reversion on every review.

mod algorithm;
mod scheduler;

pub use algorithm::{
    initial_difficulty,
    initial_stability,
    next_difficulty,
    next_forget_stability,
    next_recall_stability,
    // Core functions
    retrievability,
    stability_to_interval,
    DEFAULT_RETENTION,
    // Constants
    FSRS_WEIGHTS,
    MAX_DIFFICULTY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
};

pub use scheduler::{CardState, FsrsError, FsrsParameters, FsrsScheduler, Rating, ReviewResult};
