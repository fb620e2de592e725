//! Session registry
//!
//! Owns the live sessions, keyed by id. Each entry carries its own mutex,
//! so operations on different sessions never contend and eviction of one
//! session cannot disturb an in-flight operation on another. Expiry is
//! checked lazily on every lookup, with an optional periodic sweeper for
//! sessions nobody touches again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::session::machine::{ReviewSession, SessionError, SessionSummary};

// ============================================================================
// REGISTRY
// ============================================================================

struct SessionEntry {
    session: Mutex<ReviewSession>,
    created_at: DateTime<Utc>,
}

/// Registry of active review sessions with TTL-based eviction.
///
/// Lookups hand out `Arc` entries, so a sweep that removes a session from
/// the map cannot invalidate a caller already holding it; subsequent
/// lookups of the evicted id report not-found rather than resurrecting
/// stale state.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionEntry>>>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Create a registry with the given session TTL in seconds
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Create a registry with the configured session TTL
    pub fn with_config(config: &crate::config::EngineConfig) -> Self {
        Self::new(config.session_ttl_secs)
    }

    /// Register a session and return its id
    pub fn insert(&self, session: ReviewSession) -> String {
        let id = session.id().to_string();
        let entry = Arc::new(SessionEntry {
            created_at: session.created_at(),
            session: Mutex::new(session),
        });
        self.map().insert(id.clone(), entry);
        id
    }

    // A poisoned lock only means a panic mid-operation elsewhere; the map
    // itself is still usable, so recover it instead of propagating.
    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<SessionEntry>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against a live session.
    ///
    /// Serializes access per session id: two concurrent calls for the same
    /// id queue on the entry mutex, while calls for different ids proceed
    /// in parallel. An expired session is evicted here and reported as
    /// not-found.
    pub fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut ReviewSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let entry = self.live_entry(session_id, Utc::now())?;
        let mut session = entry
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    /// Remove a session and return its final summary
    pub fn end(&self, session_id: &str) -> Result<SessionSummary, SessionError> {
        let entry = {
            let mut sessions = self.map();
            sessions
                .remove(session_id)
                .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?
        };
        let session = entry
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let summary = session.summary();
        tracing::info!(
            session_id,
            cards_reviewed = summary.stats.cards_reviewed,
            "Ended session"
        );
        Ok(summary)
    }

    /// Evict all sessions older than the TTL; returns how many were removed
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.map();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now - entry.created_at < self.ttl;
            if !keep {
                tracing::warn!(session_id = %id, "Evicting expired session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Number of live sessions (expired-but-unswept entries included)
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// True when no sessions are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_entry(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<SessionEntry>, SessionError> {
        let mut sessions = self.map();
        match sessions.get(session_id) {
            Some(entry) if now - entry.created_at >= self.ttl => {
                // Lazy sweep: expired entries die on first touch
                sessions.remove(session_id);
                Err(SessionError::SessionNotFound(session_id.to_string()))
            }
            Some(entry) => Ok(entry.clone()),
            None => Err(SessionError::SessionNotFound(session_id.to_string())),
        }
    }

    /// Spawn a periodic background sweep on the current tokio runtime.
    ///
    /// Aborting the returned handle stops the sweeper without touching
    /// live sessions.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        period: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = registry.sweep(Utc::now());
                if evicted > 0 {
                    tracing::info!(evicted, "Background session sweep");
                }
            }
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
