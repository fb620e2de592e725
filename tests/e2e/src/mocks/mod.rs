//! Test fixtures and mock collaborators

mod fixtures;

pub use fixtures::{exercise_pool_for, FixedAssessor, FlakyAssessor};
