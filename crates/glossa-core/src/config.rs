//! Engine configuration
//!
//! One explicit settings struct passed into construction. Neither the
//! scheduler nor the adaptive policy reads ambient state, so both stay pure
//! and independently testable.

use serde::{Deserialize, Serialize};

/// Engine-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Target recall probability at review time, in (0, 1)
    pub target_retention: f64,
    /// Baseline new cards introduced per session
    pub max_new_cards_per_session: usize,
    /// Reviews fetched per session
    pub max_reviews_per_session: usize,
    /// New cards per due review (0.25 = one new card per four reviews)
    pub new_card_ratio: f64,
    /// Idle seconds after which a session may be evicted
    pub session_ttl_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_retention: 0.9,
            max_new_cards_per_session: 10,
            max_reviews_per_session: 20,
            new_card_ratio: 0.25,
            session_ttl_secs: 7200,
        }
    }
}
