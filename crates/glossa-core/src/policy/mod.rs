//! Adaptive scheduling policy
//!
//! Computes session-level limits and exercise-difficulty hints from recent
//! performance signals. Evaluated once per session start, not per card.
//! Every decision carries a human-readable justification for session
//! summaries and telemetry.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::config::EngineConfig;
use crate::exercise::DifficultyTier;
use crate::session::SessionContext;

// ============================================================================
// DECISIONS
// ============================================================================

/// The policy's session-limit decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitDecision {
    /// New cards to introduce this session
    pub new_limit: usize,
    /// Due reviews to fetch this session
    pub review_limit: usize,
    /// Why these limits were chosen
    pub reasoning: String,
}

/// The policy's exercise-difficulty hint for one card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDecision {
    /// Target exercise difficulty tier
    pub tier: DifficultyTier,
    /// Why this tier was chosen
    pub reasoning: String,
}

// ============================================================================
// POLICY
// ============================================================================

/// Adaptive session policy.
///
/// Holds the configured baselines; all performance signals arrive through
/// the session context, never from ambient state.
#[derive(Debug, Clone)]
pub struct AdaptivePolicy {
    base_new: usize,
    base_review: usize,
}

impl AdaptivePolicy {
    /// Create a policy from engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            base_new: config.max_new_cards_per_session,
            base_review: config.max_reviews_per_session,
        }
    }

    /// Create a policy with explicit baselines
    pub fn with_baselines(base_new: usize, base_review: usize) -> Self {
        Self {
            base_new,
            base_review,
        }
    }

    /// Compute new/review limits for a session.
    ///
    /// Accuracy branches are evaluated top to bottom, first match wins.
    /// The failure-streak override runs last and unconditionally zeroes the
    /// new-card limit: three misses in a row pause new material even when
    /// session-wide accuracy still looks fine (recency beats aggregate).
    pub fn session_limits(&self, ctx: &SessionContext) -> LimitDecision {
        let accuracy = ctx.session_accuracy();
        let count = ctx.session_count();

        let (mut new_limit, mut reasoning) = if count >= 5 && accuracy < 0.6 {
            let limit = (self.base_new / 3).max(2);
            (
                limit,
                format!(
                    "Accuracy is {:.0}%, reducing new cards to {} so you can focus on reviewing.",
                    accuracy * 100.0,
                    limit
                ),
            )
        } else if count >= 5 && accuracy < 0.75 {
            let limit = (self.base_new / 2).max(3);
            (
                limit,
                format!(
                    "Accuracy is {:.0}%, slightly reducing new cards to {}.",
                    accuracy * 100.0,
                    limit
                ),
            )
        } else if count >= 10 && accuracy >= 0.9 {
            let limit = (self.base_new + 5).min(20);
            (
                limit,
                format!(
                    "Great accuracy ({:.0}%)! Increasing new cards to {}.",
                    accuracy * 100.0,
                    limit
                ),
            )
        } else {
            (
                self.base_new,
                format!(
                    "Standard limits: {} new, {} reviews.",
                    self.base_new, self.base_review
                ),
            )
        };

        let streak = ctx.failure_streak();
        if streak >= 3 {
            new_limit = 0;
            reasoning = format!(
                "You've missed the last {} cards, pausing new cards to focus on review.",
                streak
            );
        }

        LimitDecision {
            new_limit,
            review_limit: self.base_review,
            reasoning,
        }
    }

    /// Pick the target exercise difficulty tier for a card.
    ///
    /// Precedence: brand-new and struggling cards get recognition; a weak
    /// session pulls everything down to recognition; strong mature cards
    /// climb to production, then recall.
    pub fn difficulty_hint(&self, card: &Card, ctx: &SessionContext) -> TierDecision {
        let state = &card.state;

        if state.reps == 0 {
            return TierDecision {
                tier: DifficultyTier::Recognition,
                reasoning: "New card, starting with recognition.".to_string(),
            };
        }

        if state.lapses >= 3 {
            return TierDecision {
                tier: DifficultyTier::Recognition,
                reasoning: format!(
                    "Card has {} lapses, rebuilding confidence with recognition.",
                    state.lapses
                ),
            };
        }

        if ctx.session_count() >= 5 && ctx.session_accuracy() < 0.6 {
            return TierDecision {
                tier: DifficultyTier::Recognition,
                reasoning: format!(
                    "Session accuracy is {:.0}%, easing back to recognition.",
                    ctx.session_accuracy() * 100.0
                ),
            };
        }

        if state.reps >= 8 && state.stability > 30.0 {
            return TierDecision {
                tier: DifficultyTier::Production,
                reasoning: "Well-known card, testing full production.".to_string(),
            };
        }

        if state.reps >= 5 && state.stability > 10.0 {
            return TierDecision {
                tier: DifficultyTier::Recall,
                reasoning: "Mature card, testing active recall.".to_string(),
            };
        }

        if state.reps >= 2 {
            return TierDecision {
                tier: DifficultyTier::Recall,
                reasoning: "Card has some successful reviews, moving to recall.".to_string(),
            };
        }

        TierDecision {
            tier: DifficultyTier::Recognition,
            reasoning: "Early card, recognition first.".to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
