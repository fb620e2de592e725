//! Response assessment
//!
//! Grades a learner's response against an exercise and suggests an FSRS
//! rating. The [`Assessor`] trait is the collaborator seam consulted on
//! every answer; [`ExactAssessor`] is the built-in normalized string
//! matcher. Richer assessors (LLM-backed fuzzy grading) plug in behind the
//! same trait and may fail transiently, which is what [`AssessError`]
//! models.

use serde::{Deserialize, Serialize};

use crate::exercise::{Exercise, ExerciseKind};
use crate::fsrs::Rating;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Assessment error type
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    /// The assessment backend is temporarily unavailable
    #[error("assessment unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// GRADES
// ============================================================================

/// How correct a response is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Exact or near-exact match
    Correct,
    /// Minor error (typo, small variation)
    Close,
    /// Shows understanding but significant errors
    Partial,
    /// Fundamentally wrong
    Incorrect,
}

impl Grade {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Correct => "correct",
            Grade::Close => "close",
            Grade::Partial => "partial",
            Grade::Incorrect => "incorrect",
        }
    }

    /// The FSRS rating this grade suggests.
    ///
    /// Close maps to Good (3), one step below Correct's Easy (4): a
    /// near-miss is still treated as a successful recall for scheduling.
    pub fn suggested_rating(&self) -> Rating {
        match self {
            Grade::Correct => Rating::Easy,
            Grade::Close => Rating::Good,
            Grade::Partial => Rating::Hard,
            Grade::Incorrect => Rating::Again,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ASSESSMENT
// ============================================================================

/// The result of assessing a learner's response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// How correct the response was
    pub grade: Grade,
    /// The rating the assessor suggests applying
    pub suggested_rating: Rating,
    /// Explanation for the learner
    pub feedback: String,
    /// The expected answer
    pub expected: String,
    /// What the learner answered
    pub actual: String,
    /// Whether the match was exact after normalization
    pub is_exact_match: bool,
}

/// Response-assessment collaborator consulted by `submit_answer`
pub trait Assessor: Send + Sync {
    /// Assess a response against the exercise it answers
    fn assess(&self, response: &str, exercise: &Exercise) -> Result<Assessment, AssessError>;
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize text for comparison: trim, lowercase, strip zero-width
/// characters and meaning-neutral punctuation (including the danda).
pub fn normalize_for_comparison(text: &str) -> String {
    const ZERO_WIDTH: [char; 4] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];
    const PUNCTUATION: [char; 11] = ['.', ',', '!', '?', '।', ';', ':', '\'', '"', '(', ')'];

    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c) && !PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

// ============================================================================
// EXACT ASSESSOR
// ============================================================================

/// Normalized exact-match assessor.
///
/// Fast and infallible. Carries an optional table of equivalence pairs for
/// spelling variations that should be treated as the same answer (e.g.
/// common matra variants in Devanagari).
#[derive(Debug, Clone, Default)]
pub struct ExactAssessor {
    equivalences: Vec<(String, String)>,
}

impl ExactAssessor {
    /// Create an assessor with no equivalence table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assessor with a language-specific equivalence table
    pub fn with_equivalences(pairs: Vec<(String, String)>) -> Self {
        Self { equivalences: pairs }
    }

    /// Check whether two strings match after normalization, considering
    /// the equivalence table in both directions.
    pub fn matches(&self, response: &str, expected: &str) -> bool {
        let response = normalize_for_comparison(response);
        let expected = normalize_for_comparison(expected);

        if response == expected {
            return true;
        }

        for (a, b) in &self.equivalences {
            if response.replace(a.as_str(), b) == expected
                || response.replace(b.as_str(), a) == expected
                || expected.replace(a.as_str(), b) == response
                || expected.replace(b.as_str(), a) == response
            {
                return true;
            }
        }

        false
    }

    fn assess_free_response(&self, response: &str, expected: &str) -> Assessment {
        if self.matches(response, expected) {
            Assessment {
                grade: Grade::Correct,
                suggested_rating: Grade::Correct.suggested_rating(),
                feedback: "Correct!".to_string(),
                expected: expected.to_string(),
                actual: response.to_string(),
                is_exact_match: true,
            }
        } else {
            Assessment {
                grade: Grade::Incorrect,
                suggested_rating: Grade::Incorrect.suggested_rating(),
                feedback: format!("Expected: {}", expected),
                expected: expected.to_string(),
                actual: response.to_string(),
                is_exact_match: false,
            }
        }
    }

    fn assess_mcq(&self, selected: &str, expected: &str) -> Assessment {
        if normalize_for_comparison(selected) == normalize_for_comparison(expected) {
            Assessment {
                grade: Grade::Correct,
                // MCQ correct suggests Good, not Easy - recognition is
                // weaker evidence of recall than production
                suggested_rating: Rating::Good,
                feedback: "Correct!".to_string(),
                expected: expected.to_string(),
                actual: selected.to_string(),
                is_exact_match: true,
            }
        } else {
            Assessment {
                grade: Grade::Incorrect,
                suggested_rating: Rating::Again,
                feedback: format!("The correct answer was: {}", expected),
                expected: expected.to_string(),
                actual: selected.to_string(),
                is_exact_match: false,
            }
        }
    }
}

impl Assessor for ExactAssessor {
    fn assess(&self, response: &str, exercise: &Exercise) -> Result<Assessment, AssessError> {
        let assessment = match exercise.kind {
            ExerciseKind::Mcq => self.assess_mcq(response, &exercise.answer),
            ExerciseKind::Cloze | ExerciseKind::Translation => {
                self.assess_free_response(response, &exercise.answer)
            }
        };
        Ok(assessment)
    }
}

// ============================================================================
// TESTS
// ============================================================================
