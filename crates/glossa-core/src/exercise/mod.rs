//! Exercise types and the exercise-selection seam
//!
//! Exercises are tagged by kind (recognition, recall, production) rather
//! than by free-form type strings, so assessment and selection can branch
//! on a closed set. The [`ExerciseSource`] trait is the narrow interface
//! the session consults; [`PooledExerciseSource`] is an in-process
//! implementation over a pre-generated pool.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// How many recently-presented kinds to remember when varying selection
const RECENT_KINDS: usize = 5;

// ============================================================================
// EXERCISE KIND
// ============================================================================

/// The kind of exercise presented for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    /// Multiple choice - recognition, easiest
    Mcq,
    /// Fill-in-the-blank - recall with context
    Cloze,
    /// Full translation - production, hardest
    Translation,
}

impl ExerciseKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Mcq => "mcq",
            ExerciseKind::Cloze => "cloze",
            ExerciseKind::Translation => "translation",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mcq" => Some(ExerciseKind::Mcq),
            "cloze" => Some(ExerciseKind::Cloze),
            "translation" => Some(ExerciseKind::Translation),
            _ => None,
        }
    }

    /// Difficulty ranking (easier first)
    pub fn difficulty_rank(&self) -> u8 {
        match self {
            ExerciseKind::Mcq => 1,
            ExerciseKind::Cloze => 2,
            ExerciseKind::Translation => 3,
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DIFFICULTY TIER
// ============================================================================

/// Target exercise difficulty tier, produced by the adaptive policy and
/// consumed by exercise selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    /// Easiest: recognition exercises
    Recognition,
    /// Middle: contextual recall
    Recall,
    /// Hardest: full production
    Production,
}

impl DifficultyTier {
    /// The exercise kind this tier maps to
    pub fn preferred_kind(&self) -> ExerciseKind {
        match self {
            DifficultyTier::Recognition => ExerciseKind::Mcq,
            DifficultyTier::Recall => ExerciseKind::Cloze,
            DifficultyTier::Production => ExerciseKind::Translation,
        }
    }
}

// ============================================================================
// EXERCISE
// ============================================================================

/// One presentable exercise for a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The content item this exercise drills
    pub content_id: String,
    /// Exercise kind
    pub kind: ExerciseKind,
    /// The prompt shown to the learner
    pub prompt: String,
    /// The expected answer
    pub answer: String,
    /// MCQ options (empty for other kinds)
    #[serde(default)]
    pub options: Vec<String>,
}

impl Exercise {
    /// Create an exercise with a fresh id
    pub fn new(
        content_id: impl Into<String>,
        kind: ExerciseKind,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_id: content_id.into(),
            kind,
            prompt: prompt.into(),
            answer: answer.into(),
            options: Vec::new(),
        }
    }

    /// MCQ constructor with options
    pub fn mcq(
        content_id: impl Into<String>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        let mut exercise = Self::new(content_id, ExerciseKind::Mcq, prompt, answer);
        exercise.options = options;
        exercise
    }
}

// ============================================================================
// SELECTION SEAM
// ============================================================================

/// Exercise-selection collaborator consulted by the session at `get_next`.
///
/// Returns `None` when the card's content has no presentable exercise; the
/// session then skips the card rather than failing.
pub trait ExerciseSource: Send {
    /// Select an exercise for the card, guided by the policy's difficulty
    /// tier hint.
    fn select(&mut self, card: &Card, hint: DifficultyTier) -> Option<Exercise>;
}

/// In-process exercise source over a pre-generated pool.
///
/// Selection prefers the hinted kind and avoids kinds presented recently,
/// ranked the same way on every call: preferred-and-fresh, preferred,
/// fresh, anything. Deterministic by construction - presentation order is
/// reproducible for a fixed pool.
#[derive(Debug, Default)]
pub struct PooledExerciseSource {
    pool: HashMap<String, Vec<Exercise>>,
    recent: VecDeque<ExerciseKind>,
}

impl PooledExerciseSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exercise to the pool
    pub fn add(&mut self, exercise: Exercise) {
        self.pool
            .entry(exercise.content_id.clone())
            .or_default()
            .push(exercise);
    }

    /// Number of exercises available for a content item
    pub fn available_for(&self, content_id: &str) -> usize {
        self.pool.get(content_id).map_or(0, Vec::len)
    }

    fn remember(&mut self, kind: ExerciseKind) {
        self.recent.push_back(kind);
        while self.recent.len() > RECENT_KINDS {
            self.recent.pop_front();
        }
    }
}

impl ExerciseSource for PooledExerciseSource {
    fn select(&mut self, card: &Card, hint: DifficultyTier) -> Option<Exercise> {
        let candidates = self.pool.get(&card.content_id)?;
        if candidates.is_empty() {
            return None;
        }

        let preferred = hint.preferred_kind();
        let recent: Vec<ExerciseKind> = self.recent.iter().copied().collect();

        // Rank: preferred fresh > preferred stale > other fresh > other stale
        let chosen = candidates
            .iter()
            .min_by_key(|ex| {
                let is_preferred = ex.kind == preferred;
                let is_fresh = !recent.contains(&ex.kind);
                match (is_preferred, is_fresh) {
                    (true, true) => 0,
                    (true, false) => 1,
                    (false, true) => 2,
                    (false, false) => 3,
                }
            })?
            .clone();

        self.remember(chosen.kind);
        Some(chosen)
    }
}

// ============================================================================
// TESTS
// ============================================================================
