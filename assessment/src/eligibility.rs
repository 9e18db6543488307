//! # Submission Eligibility
//!
//! Pure decisions on whether an actor may submit, update, withdraw or grade right now.
//!
//! The `can_*` functions answer with a plain `bool` for enabling and disabling controls. The
//! matching `check_*` functions evaluate the same rules in a fixed order and report the first
//! one that fails as `NotPermitted(reason)`, for callers that need to explain a refusal.
//!
//! The overdue flag only blocks *new* work (submit, update). Withdrawal depends on ownership and
//! publication alone, and grading on role alone.

use log::debug;

use crate::error::{AssessmentError, DenialReason, Result};
use crate::models::{LifecycleState, Role, Submission};

fn deny(reason: DenialReason) -> Result<()> {
    Err(AssessmentError::NotPermitted(reason))
}

/// A student may create a submission while the assignment is published and not overdue,
/// provided none exists yet.
pub fn check_submit(
    role: Role,
    existing_submission: Option<&Submission>,
    assignment_status: LifecycleState,
    overdue: bool,
) -> Result<()> {
    if role != Role::Student {
        return deny(DenialReason::WrongRole);
    }
    if existing_submission.is_some() {
        return deny(DenialReason::AlreadySubmitted);
    }
    if assignment_status != LifecycleState::Published {
        return deny(DenialReason::NotPublished);
    }
    if overdue {
        return deny(DenialReason::Overdue);
    }
    Ok(())
}

pub fn can_submit(
    role: Role,
    existing_submission: Option<&Submission>,
    assignment_status: LifecycleState,
    overdue: bool,
) -> bool {
    let verdict = check_submit(role, existing_submission, assignment_status, overdue);
    debug!("can_submit role={role} status={assignment_status} overdue={overdue}: {verdict:?}");
    verdict.is_ok()
}

/// The owning student may replace an ungraded submission under the same window as submitting.
pub fn check_update(
    role: Role,
    submission: &Submission,
    assignment_status: LifecycleState,
    overdue: bool,
    is_owner: bool,
) -> Result<()> {
    if role != Role::Student {
        return deny(DenialReason::WrongRole);
    }
    if !is_owner {
        return deny(DenialReason::NotOwner);
    }
    if assignment_status != LifecycleState::Published {
        return deny(DenialReason::NotPublished);
    }
    if overdue {
        return deny(DenialReason::Overdue);
    }
    if submission.is_graded() {
        return deny(DenialReason::AlreadyGraded);
    }
    Ok(())
}

pub fn can_update(
    role: Role,
    submission: &Submission,
    assignment_status: LifecycleState,
    overdue: bool,
    is_owner: bool,
) -> bool {
    check_update(role, submission, assignment_status, overdue, is_owner).is_ok()
}

/// Withdrawal needs ownership and a published assignment, whatever the deadline says.
/// Once an assignment is completed or removed, withdrawal is always refused.
pub fn check_withdraw(
    _role: Role,
    _submission: &Submission,
    assignment_status: LifecycleState,
    is_owner: bool,
) -> Result<()> {
    if !is_owner {
        return deny(DenialReason::NotOwner);
    }
    if assignment_status != LifecycleState::Published {
        return deny(DenialReason::NotPublished);
    }
    Ok(())
}

pub fn can_withdraw(
    role: Role,
    submission: &Submission,
    assignment_status: LifecycleState,
    is_owner: bool,
) -> bool {
    let verdict = check_withdraw(role, submission, assignment_status, is_owner);
    debug!(
        "can_withdraw submission={} status={assignment_status} owner={is_owner}: {verdict:?}",
        submission.id
    );
    verdict.is_ok()
}

/// Instructors and admins grade, regardless of deadline or lifecycle state.
pub fn check_grade(role: Role) -> Result<()> {
    if role.is_staff() {
        Ok(())
    } else {
        deny(DenialReason::WrongRole)
    }
}

pub fn can_grade(role: Role) -> bool {
    check_grade(role).is_ok()
}
