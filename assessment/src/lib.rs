//! # Assessment Engine
//!
//! Rules behind assignment deadlines, submissions and grades for a learning-management client.
//! Apart from the countdown loop, everything here is a pure, synchronous function of its inputs;
//! "now" and the caller's timezone offset are always passed in.
//!
//! ## Modules
//! - [`time`]: local wall clock <-> UTC instant, remaining time, overdue checks.
//! - [`urgency`]: remaining time -> badge tier.
//! - [`lifecycle`]: guarded draft/published/completed/removed state machine.
//! - [`eligibility`]: who may submit, update, withdraw or grade right now.
//! - [`rubric`]: rubric aggregation, manual overrides, percentages.
//! - [`countdown`]: cancellable once-per-second refresh loop over caller-owned state.
//!
//! Persistence, HTTP and UI are collaborators that call into this crate.

pub mod bootstrap;
pub mod countdown;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod rubric;
pub mod time;
pub mod urgency;

pub use error::{AssessmentError, DenialReason, Result};
pub use models::{
    Assignment, FileRef, Grade, Instant, LifecycleState, LocalWallClock, Role, RubricCriterion,
    Submission, SubmissionStatus, SubmissionType,
};
