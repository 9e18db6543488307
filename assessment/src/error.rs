//! Assessment Error Types
//!
//! This module defines [`AssessmentError`], the single error type returned by every fallible
//! engine operation. Expected domain conditions (an illegal lifecycle edge, a score above its
//! criterion ceiling, a student who already submitted) are values of this enum, never panics.
//!
//! The `Display` output is meant for logs. Translating a variant into user-facing text is the
//! calling layer's job.
//!
//! # Example
//!
//! ```rust
//! use assessment::error::AssessmentError;
//! use assessment::rubric::percentage;
//!
//! assert!(matches!(percentage(10.0, 0.0), Err(AssessmentError::InvalidMaxScore(_))));
//! ```

use crate::models::LifecycleState;
use strum::Display;
use thiserror::Error;

/// Why an eligibility check refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DenialReason {
    /// The actor's role may not perform this action.
    WrongRole,
    /// The actor does not own the submission.
    NotOwner,
    /// A submission already exists for this student.
    AlreadySubmitted,
    /// There is no submission to act on.
    NoSubmission,
    /// The assignment is not currently published.
    NotPublished,
    /// The deadline has passed.
    Overdue,
    /// The submission has been graded and is frozen.
    AlreadyGraded,
}

/// Represents all error types that can occur in the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    /// Unparseable timestamp, impossible calendar value, or out-of-range arithmetic.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A score outside `[0, max]`. `criterion` is `None` for a manual total.
    #[error("score {score} out of bounds [0, {max}]{}", criterion_suffix(.criterion))]
    ScoreOutOfBounds {
        criterion: Option<usize>,
        score: f64,
        max: f64,
    },

    /// A maximum score that is zero, negative or not a number.
    #[error("max score must be greater than zero, got {0}")]
    InvalidMaxScore(f64),

    /// An illegal lifecycle edge or an unmet transition guard.
    #[error("cannot move assignment from {from} to {to}: {reason}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
        reason: String,
    },

    /// An eligibility check failed for a reason other than lifecycle legality.
    #[error("action not permitted: {0}")]
    NotPermitted(DenialReason),

    /// A score was supplied for a criterion index the rubric does not have.
    #[error("rubric has no criterion at index {0}")]
    UnknownCriterion(usize),

    /// Rubric edits are rejected once any submission has been graded against it.
    #[error("rubric is locked: {graded} submission(s) already graded")]
    RubricLocked { graded: usize },
}

fn criterion_suffix(criterion: &Option<usize>) -> String {
    criterion
        .map(|i| format!(" for criterion {i}"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, AssessmentError>;
