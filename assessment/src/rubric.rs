//! # Rubric Scorer
//!
//! This module turns per-criterion scores and an optional manual override into a final total
//! and percentage.
//!
//! - [`aggregate`] sums the scores awarded against a rubric, validating each against its
//!   criterion's ceiling.
//! - [`effective_total`] applies the manual override, which always wins when present.
//! - [`percentage`] expresses a total against the assignment maximum. Bonus marks are allowed,
//!   so results above 100 are returned as-is.
//! - [`summarize`] runs all three for a stored [`Grade`].
//!
//! Rubric edits are frozen once grading has begun: see [`ensure_rubric_editable`].

use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AssessmentError, Result};
use crate::models::{Assignment, Grade, RubricCriterion, Submission};

/// Sums the awarded scores against `criteria`.
///
/// # Arguments
///
/// * `criteria` - The rubric, in order. Indices into this slice are the keys of `scores`.
/// * `scores` - Criterion index to awarded score. Criteria without an entry contribute 0.
///
/// # Returns
///
/// - `Ok(f64)`: the sum of the supplied scores (0 for an empty map).
/// - `Err(ScoreOutOfBounds)`: a score outside `[0, criterion.max_score]`, NaN included.
/// - `Err(UnknownCriterion)`: a key past the end of the rubric.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use assessment::models::RubricCriterion;
/// use assessment::rubric::aggregate;
///
/// let rubric = vec![RubricCriterion::new("Thesis", 10.0), RubricCriterion::new("Style", 5.0)];
/// let scores = BTreeMap::from([(0, 8.0), (1, 4.5)]);
/// assert_eq!(aggregate(&rubric, &scores).unwrap(), 12.5);
/// ```
pub fn aggregate(criteria: &[RubricCriterion], scores: &BTreeMap<usize, f64>) -> Result<f64> {
    let mut total = 0.0;

    for (&index, &score) in scores {
        let criterion = criteria
            .get(index)
            .ok_or(AssessmentError::UnknownCriterion(index))?;

        if !(0.0..=criterion.max_score).contains(&score) {
            return Err(AssessmentError::ScoreOutOfBounds {
                criterion: Some(index),
                score,
                max: criterion.max_score,
            });
        }

        total += score;
    }

    Ok(total)
}

/// The manual override if one is set, otherwise the rubric sum.
pub fn effective_total(rubric_sum: f64, manual_total: Option<f64>) -> f64 {
    manual_total.unwrap_or(rubric_sum)
}

/// `round(100 * total / max_score)`. Not clamped: 60 out of 50 is 120.
///
/// A non-finite `total` is `ScoreOutOfBounds`; it would otherwise saturate through `as i64`.
pub fn percentage(total: f64, max_score: f64) -> Result<i64> {
    if !(max_score.is_finite() && max_score > 0.0) {
        return Err(AssessmentError::InvalidMaxScore(max_score));
    }
    if !total.is_finite() {
        return Err(AssessmentError::ScoreOutOfBounds {
            criterion: None,
            score: total,
            max: max_score,
        });
    }
    Ok((100.0 * total / max_score).round() as i64)
}

/// `0 <= total <= max_score`.
pub fn validate_total(total: f64, max_score: f64) -> bool {
    (0.0..=max_score).contains(&total)
}

/// [`validate_total`] as a `Result`, for deciding whether a manual override may be stored.
pub fn check_manual_total(total: f64, max_score: f64) -> Result<()> {
    if validate_total(total, max_score) {
        Ok(())
    } else {
        Err(AssessmentError::ScoreOutOfBounds {
            criterion: None,
            score: total,
            max: max_score,
        })
    }
}

impl Grade {
    /// Stores (or clears) the manual override after bounds-checking it against `max_score`.
    pub fn set_manual_total(&mut self, total: Option<f64>, max_score: f64) -> Result<()> {
        if let Some(total) = total {
            check_manual_total(total, max_score)?;
        }
        self.manual_total = total;
        Ok(())
    }

    /// Records one criterion score after checking it against the rubric.
    pub fn set_criterion_score(
        &mut self,
        criteria: &[RubricCriterion],
        index: usize,
        score: f64,
    ) -> Result<()> {
        let single = BTreeMap::from([(index, score)]);
        aggregate(criteria, &single)?;
        self.per_criterion_scores.insert(index, score);
        Ok(())
    }
}

/// Everything a score display needs for one graded submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub rubric_sum: f64,
    pub effective_total: f64,
    pub percentage: i64,
    /// No rubric scores and no manual total have been recorded.
    pub ungraded: bool,
}

impl GradeSummary {
    pub fn passed(&self, pass_mark: u32) -> bool {
        !self.ungraded && self.percentage >= i64::from(pass_mark)
    }
}

/// A stored override must be a finite, non-negative number. Values above `max_score` are
/// bonus marks and pass.
fn check_stored_total(total: f64, max_score: f64) -> Result<()> {
    if total.is_finite() && total >= 0.0 {
        Ok(())
    } else {
        Err(AssessmentError::ScoreOutOfBounds {
            criterion: None,
            score: total,
            max: max_score,
        })
    }
}

/// Aggregates `grade` against `assignment`'s rubric and maximum.
///
/// `grade` may come straight from storage, so its manual total is checked again here.
pub fn summarize(assignment: &Assignment, grade: &Grade) -> Result<GradeSummary> {
    let rubric_sum = aggregate(&assignment.rubric, &grade.per_criterion_scores)?;
    if let Some(total) = grade.manual_total {
        check_stored_total(total, assignment.max_score)?;
    }
    let effective = effective_total(rubric_sum, grade.manual_total);
    let pct = percentage(effective, assignment.max_score)?;

    debug!(
        "assignment {}: rubric_sum={rubric_sum} effective={effective} pct={pct}",
        assignment.id
    );

    Ok(GradeSummary {
        rubric_sum,
        effective_total: effective,
        percentage: pct,
        ungraded: grade.is_empty(),
    })
}

/// Refuses rubric edits once any of `submissions` carries a grade.
///
/// Existing per-criterion scores are keyed by index against the old rubric and there is no
/// rule for carrying them over, so the edit is rejected instead.
pub fn ensure_rubric_editable(submissions: &[Submission]) -> Result<()> {
    let graded = submissions.iter().filter(|s| s.is_graded()).count();
    if graded > 0 {
        return Err(AssessmentError::RubricLocked { graded });
    }
    Ok(())
}

impl Assignment {
    /// Replaces the rubric if no submission has been graded yet.
    pub fn replace_rubric(
        &mut self,
        rubric: Vec<RubricCriterion>,
        submissions: &[Submission],
    ) -> Result<()> {
        if let Some(bad) = rubric
            .iter()
            .find(|c| !(c.max_score.is_finite() && c.max_score >= 0.0))
        {
            return Err(AssessmentError::InvalidMaxScore(bad.max_score));
        }
        if let Err(err) = ensure_rubric_editable(submissions) {
            warn!("assignment {} rubric edit rejected: {err}", self.id);
            return Err(err);
        }
        self.rubric = rubric;
        Ok(())
    }
}
