//! FSRS Core Algorithm Functions
//!
//! Pure mathematical functions implementing the power forgetting curve and
//! the stability/difficulty update rules. No I/O, no clock access - every
//! function takes its inputs explicitly, which keeps this module trivially
//! testable and safe to call from any thread.

// ============================================================================
// CONSTANTS
// ============================================================================

/// FSRS-4.5 default weight vector.
///
/// - w\[0..3\]: initial stability for ratings Again/Hard/Good/Easy
/// - w\[4\]: difficulty mean-reversion anchor
/// - w\[5\]: difficulty update multiplier
/// - w\[6\]: stability decay exponent (lapse)
/// - w\[7\]: stability increase base (lapse)
/// - w\[8\]: stability increase factor (success)
/// - w\[9\]: difficulty-stability interaction
/// - w\[10\]: stability-stability interaction (power)
/// - w\[11..12\]: reserved hard-penalty / easy-bonus factors
pub const FSRS_WEIGHTS: [f64; 13] = [
    0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05,
];

/// Default target retention probability (90%)
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Minimum inherent difficulty
pub const MIN_DIFFICULTY: f64 = 0.01;

/// Maximum inherent difficulty
pub const MAX_DIFFICULTY: f64 = 0.99;

/// Minimum stability in days (~2.4 hours)
pub const MIN_STABILITY: f64 = 0.1;

// ============================================================================
// FORGETTING CURVE
// ============================================================================

/// Probability of recall after `elapsed_days` at the given stability.
///
/// Power forgetting curve: R = (1 + t / (9 * S))^-1.
///
/// Returns 1.0 for non-positive elapsed time or non-positive stability, so
/// early reviews and degenerate inputs never produce probabilities outside
/// (0, 1].
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    if stability <= 0.0 || elapsed_days <= 0.0 {
        return 1.0;
    }
    (1.0 + elapsed_days / (9.0 * stability)).powi(-1)
}

/// Convert stability to a review interval in days for a target retention.
///
/// Derived from R = (1 + t / (9 * S))^-1 solved for t at R = retention:
/// t = 9 * S * (1/retention - 1).
pub fn stability_to_interval(stability: f64, target_retention: f64) -> f64 {
    9.0 * stability * (1.0 / target_retention - 1.0)
}

// ============================================================================
// INITIAL STATE
// ============================================================================

/// Initial stability after the first-ever review, from w\[0..3\].
///
/// `rating` must already be clamped to 1..=4.
pub fn initial_stability(rating: i32, w: &[f64; 13]) -> f64 {
    w[(rating - 1) as usize]
}

/// Initial difficulty after the first-ever review.
///
/// D0 = (w4 - (rating - 3) * w5) / 10, clamped to the difficulty bounds.
pub fn initial_difficulty(rating: i32, w: &[f64; 13]) -> f64 {
    let d = (w[4] - (rating - 3) as f64 * w[5]) / 10.0;
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// STATE UPDATES
// ============================================================================

/// Updated difficulty after a review, via mean reversion.
///
/// The rating's deviation from Good nudges difficulty, then the result is
/// blended 70/30 toward the anchor w4/10. Always clamped.
pub fn next_difficulty(current: f64, rating: i32, w: &[f64; 13]) -> f64 {
    let delta = -((rating - 3) as f64) * w[5] / 10.0;
    let nudged = current + delta;
    let mean = w[4] / 10.0;
    let reverted = mean + 0.7 * (nudged - mean);
    reverted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// New stability after a successful review (rating >= 2).
///
/// S' = S * (1 + e^(w8) * (11 - 10*D) * S^(-w10) * (e^(w9*(1-R)) - 1))
///
/// Growth is larger for easier items (low D) and for recalls that were less
/// likely to succeed (low R) - surprising successes strengthen memory most.
pub fn next_recall_stability(
    stability: f64,
    difficulty: f64,
    retrievability: f64,
    w: &[f64; 13],
) -> f64 {
    let factor = w[8].exp()
        * (11.0 - difficulty * 10.0)
        * stability.powf(-w[10])
        * ((w[9] * (1.0 - retrievability)).exp() - 1.0);
    stability * (1.0 + factor)
}

/// New stability after a lapse (rating = 1).
///
/// S' = w7 * D^(-w6) * ((S+1)^w10 - 1), capped at half the prior stability
/// so forgetting always reduces stability.
pub fn next_forget_stability(stability: f64, difficulty: f64, w: &[f64; 13]) -> f64 {
    let s = w[7] * difficulty.powf(-w[6]) * ((stability + 1.0).powf(w[10]) - 1.0);
    s.min(stability * 0.5)
}

// ============================================================================
// TESTS
// ============================================================================
