//! Fixture builders and mock collaborators for journey tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use glossa_core::{
    AssessError, Assessment, Assessor, Card, Exercise, ExerciseKind, Grade, PooledExerciseSource,
    Rating,
};

/// Build an exercise pool with one exercise of every kind per card, each
/// answered by the card's term.
pub fn exercise_pool_for(cards: &[Card]) -> PooledExerciseSource {
    let mut pool = PooledExerciseSource::new();
    for card in cards {
        pool.add(Exercise::mcq(
            &card.content_id,
            format!("Which word means '{}'?", card.term),
            &card.term,
            vec![card.term.clone(), "distractor".to_string()],
        ));
        pool.add(Exercise::new(
            &card.content_id,
            ExerciseKind::Cloze,
            "Fill in the blank: ___",
            &card.term,
        ));
        pool.add(Exercise::new(
            &card.content_id,
            ExerciseKind::Translation,
            format!("Translate: {}", card.term),
            &card.term,
        ));
    }
    pool
}

/// Assessor that always returns the same grade, regardless of the response
pub struct FixedAssessor {
    grade: Grade,
    rating: Rating,
}

impl FixedAssessor {
    /// Create an assessor pinned to a grade, suggesting its default rating
    pub fn new(grade: Grade) -> Self {
        Self {
            grade,
            rating: grade.suggested_rating(),
        }
    }
}

impl Assessor for FixedAssessor {
    fn assess(&self, response: &str, exercise: &Exercise) -> Result<Assessment, AssessError> {
        Ok(Assessment {
            grade: self.grade,
            suggested_rating: self.rating,
            feedback: String::new(),
            expected: exercise.answer.clone(),
            actual: response.to_string(),
            is_exact_match: self.grade == Grade::Correct,
        })
    }
}

/// Assessor that fails the first `failures` calls, then delegates to an
/// exact matcher - models a transient assessment-service outage.
pub struct FlakyAssessor {
    failures: usize,
    calls: AtomicUsize,
    inner: glossa_core::ExactAssessor,
}

impl FlakyAssessor {
    /// Fail the first `failures` assessments
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
            inner: glossa_core::ExactAssessor::new(),
        }
    }
}

impl Assessor for FlakyAssessor {
    fn assess(&self, response: &str, exercise: &Exercise) -> Result<Assessment, AssessError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(AssessError::Unavailable("assessment backend timeout".into()));
        }
        self.inner.assess(response, exercise)
    }
}
