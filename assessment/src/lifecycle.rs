//! # Assignment Lifecycle
//!
//! Guarded state machine over [`LifecycleState`].
//!
//! ```text
//!            publish                 complete
//!   Draft ───────────▶ Published ───────────▶ Completed
//!     │   ◀───────────     │
//!     │     unpublish      │ remove
//!     │ remove             ▼
//!     └──────────────▶  Removed
//! ```
//!
//! ### Guards
//! - `Draft → Published` needs a non-blank title, a due instant and a max score above zero.
//!   An empty rubric is fine.
//! - `Published → Draft` is refused once any submission has been graded.
//!
//! ### Terminal states
//! - `Completed` and `Removed` have no outgoing edges. Re-opening is outside this engine.
//!
//! Every other pair, self-loops included, is an `InvalidTransition` and the state is unchanged.
//! [`transition`] only computes the next state; persisting it is the caller's job.

use log::{info, warn};
use validator::Validate;

use crate::error::{AssessmentError, Result};
use crate::models::{Assignment, Instant, LifecycleState};

/// Facts the transition guards look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionContext {
    pub title: Option<String>,
    pub due_instant: Option<Instant>,
    pub max_score: Option<f64>,
    pub has_graded_submissions: bool,
}

#[derive(Debug, Validate)]
struct PublishRequirements {
    #[validate(length(min = 1, message = "title is required"))]
    title: String,
    #[validate(required(message = "due date is required"))]
    due_instant: Option<Instant>,
    #[validate(range(exclusive_min = 0.0, message = "max score must be greater than zero"))]
    max_score: f64,
}

impl From<&TransitionContext> for PublishRequirements {
    fn from(ctx: &TransitionContext) -> Self {
        Self {
            title: ctx
                .title
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            due_instant: ctx.due_instant,
            // NaN and infinities slip past range comparisons; fold them into a failing value.
            max_score: ctx.max_score.filter(|m| m.is_finite()).unwrap_or(0.0),
        }
    }
}

/// Targets reachable from `state` in one step.
pub fn allowed_targets(state: LifecycleState) -> &'static [LifecycleState] {
    use LifecycleState::*;
    match state {
        Draft => &[Published, Removed],
        Published => &[Draft, Completed, Removed],
        Completed | Removed => &[],
    }
}

/// Computes the state reached by moving `current` to `target`, or why that move is illegal.
pub fn transition(
    current: LifecycleState,
    target: LifecycleState,
    ctx: &TransitionContext,
) -> Result<LifecycleState> {
    use LifecycleState::*;

    let refuse = |reason: String| AssessmentError::InvalidTransition {
        from: current,
        to: target,
        reason,
    };

    match (current, target) {
        (Draft, Published) => {
            PublishRequirements::from(ctx)
                .validate()
                .map_err(|errors| refuse(common::format_validation_errors(&errors)))?;
            Ok(Published)
        }
        (Published, Draft) if ctx.has_graded_submissions => {
            Err(refuse("graded submissions exist".into()))
        }
        (Published, Draft) | (Published, Completed) | (Published, Removed) | (Draft, Removed) => {
            Ok(target)
        }
        _ if current.is_terminal() => Err(refuse(format!("{current} is terminal"))),
        _ => Err(refuse("no such transition".into())),
    }
}

impl Assignment {
    /// Snapshot of this assignment's guard inputs.
    pub fn transition_context(&self, has_graded_submissions: bool) -> TransitionContext {
        TransitionContext {
            title: Some(self.title.clone()),
            due_instant: self.due_instant,
            max_score: Some(self.max_score),
            has_graded_submissions,
        }
    }

    /// Moves this assignment to `target`, updating `status` only on success.
    pub fn transition_to(
        &mut self,
        target: LifecycleState,
        has_graded_submissions: bool,
    ) -> Result<LifecycleState> {
        let ctx = self.transition_context(has_graded_submissions);
        match transition(self.status, target, &ctx) {
            Ok(next) => {
                info!("assignment {} moved {} -> {}", self.id, self.status, next);
                self.status = next;
                Ok(next)
            }
            Err(err) => {
                warn!("assignment {} transition rejected: {err}", self.id);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use strum::IntoEnumIterator;

    fn publishable() -> TransitionContext {
        TransitionContext {
            title: Some("x".into()),
            due_instant: Some(Utc.with_ymd_and_hms(2025, 4, 15, 23, 59, 59).unwrap()),
            max_score: Some(100.0),
            has_graded_submissions: false,
        }
    }

    #[test]
    fn test_publish_with_requirements() {
        let next = transition(LifecycleState::Draft, LifecycleState::Published, &publishable());
        assert_eq!(next, Ok(LifecycleState::Published));
    }

    #[test]
    fn test_publish_with_empty_rubric_is_allowed() {
        let mut assignment = Assignment::draft(1, "Essay", 20.0);
        assignment.due_instant = Some(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap());
        assert!(assignment.rubric.is_empty());

        assert_eq!(
            assignment.transition_to(LifecycleState::Published, false),
            Ok(LifecycleState::Published)
        );
        assert_eq!(assignment.status, LifecycleState::Published);
    }

    #[test]
    fn test_publish_missing_requirements() {
        let ctx = TransitionContext {
            title: Some("   ".into()),
            due_instant: None,
            max_score: Some(0.0),
            has_graded_submissions: false,
        };

        match transition(LifecycleState::Draft, LifecycleState::Published, &ctx) {
            Err(AssessmentError::InvalidTransition { from, to, reason }) => {
                assert_eq!(from, LifecycleState::Draft);
                assert_eq!(to, LifecycleState::Published);
                assert!(reason.contains("title is required"));
                assert!(reason.contains("due date is required"));
                assert!(reason.contains("max score must be greater than zero"));
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_publish_rejects_nan_max_score() {
        let ctx = TransitionContext {
            max_score: Some(f64::NAN),
            ..publishable()
        };
        assert!(transition(LifecycleState::Draft, LifecycleState::Published, &ctx).is_err());
    }

    #[test]
    fn test_unpublish_blocked_by_graded_submissions() {
        let ctx = TransitionContext {
            has_graded_submissions: true,
            ..Default::default()
        };
        assert!(matches!(
            transition(LifecycleState::Published, LifecycleState::Draft, &ctx),
            Err(AssessmentError::InvalidTransition { .. })
        ));

        let ctx = TransitionContext::default();
        assert_eq!(
            transition(LifecycleState::Published, LifecycleState::Draft, &ctx),
            Ok(LifecycleState::Draft)
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let ctx = publishable();
        for from in [LifecycleState::Completed, LifecycleState::Removed] {
            for to in LifecycleState::iter() {
                assert!(transition(from, to, &ctx).is_err(), "{from} -> {to} should fail");
            }
        }
    }

    /// The match in `transition` and `allowed_targets` must agree on every pair.
    #[test]
    fn test_allowed_targets_matches_transition() {
        let ctx = publishable();
        for from in LifecycleState::iter() {
            for to in LifecycleState::iter() {
                let legal = allowed_targets(from).contains(&to);
                assert_eq!(transition(from, to, &ctx).is_ok(), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_failed_transition_leaves_status_unchanged() {
        let mut assignment = Assignment::draft(3, "Lab", 10.0);
        assert!(assignment.transition_to(LifecycleState::Completed, false).is_err());
        assert_eq!(assignment.status, LifecycleState::Draft);

        assert!(assignment.transition_to(LifecycleState::Published, false).is_err());
        assert_eq!(assignment.status, LifecycleState::Draft);
    }
}
