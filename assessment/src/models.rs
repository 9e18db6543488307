//! # Models
//!
//! Records exchanged with the persistence/API collaborator. Every status-like field is a closed
//! enum; string values are parsed once at the boundary (`serde` for JSON, `strum::EnumString`
//! for bare strings) so call sites can `match` exhaustively.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{AssessmentError, Result};

/// An absolute point in time. Stored and compared in UTC only.
pub type Instant = DateTime<Utc>;

/// Publication status of an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LifecycleState {
    #[default]
    Draft,
    Published,
    Completed,
    Removed,
}

impl LifecycleState {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Completed | LifecycleState::Removed)
    }
}

/// Role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Instructors and admins.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

/// What a student is expected to hand in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubmissionType {
    Text,
    File,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubmissionStatus {
    #[default]
    Draft,
    Submitted,
    Graded,
}

/// A timezone-naive reading as typed into a local datetime control.
///
/// Always built through [`LocalWallClock::new`] or parsed from `YYYY-MM-DDTHH:MM`, so every
/// value names a real calendar minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalWallClock {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl LocalWallClock {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        let wall = Self {
            year,
            month,
            day,
            hour,
            minute,
        };
        wall.to_naive()?;
        Ok(wall)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub(crate) fn to_naive(self) -> Result<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| AssessmentError::InvalidDate(format!("no such date: {self}")))?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .ok_or_else(|| AssessmentError::InvalidDate(format!("no such time: {self}")))?;
        Ok(date.and_time(time))
    }

    pub(crate) fn from_naive(naive: NaiveDateTime) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
        }
    }
}

impl fmt::Display for LocalWallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

impl FromStr for LocalWallClock {
    type Err = AssessmentError;

    /// Accepts `YYYY-MM-DDTHH:MM`, with optional `:SS` which is dropped.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map(Self::from_naive)
            .map_err(|e| AssessmentError::InvalidDate(format!("{s:?}: {e}")))
    }
}

impl TryFrom<String> for LocalWallClock {
    type Error = AssessmentError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LocalWallClock> for String {
    fn from(value: LocalWallClock) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub label: String,
    pub max_score: f64,
    #[serde(default)]
    pub description: String,
}

impl RubricCriterion {
    pub fn new(label: impl Into<String>, max_score: f64) -> Self {
        Self {
            label: label.into(),
            max_score,
            description: String::new(),
        }
    }
}

/// An assignment owned by a course. `status` is the only copy of its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    /// Absent only while drafting; publishing requires it.
    pub due_instant: Option<Instant>,
    pub max_score: f64,
    #[serde(default)]
    pub submission_type: SubmissionType,
    #[serde(default)]
    pub rubric: Vec<RubricCriterion>,
    #[serde(default)]
    pub status: LifecycleState,
}

impl Assignment {
    /// A fresh draft with no due date and no rubric.
    pub fn draft(id: i64, title: impl Into<String>, max_score: f64) -> Self {
        Self {
            id,
            title: title.into(),
            due_instant: None,
            max_score,
            submission_type: SubmissionType::default(),
            rubric: Vec::new(),
            status: LifecycleState::Draft,
        }
    }
}

/// Opaque reference to a file held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grade {
    /// Criterion index -> awarded score. Sparse; missing criteria count as zero.
    #[serde(default)]
    pub per_criterion_scores: BTreeMap<usize, f64>,
    #[serde(default)]
    pub manual_total: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Grade {
    /// True when neither rubric scores nor a manual total have been recorded.
    pub fn is_empty(&self) -> bool {
        self.per_criterion_scores.is_empty() && self.manual_total.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_instant: Option<Instant>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub grade: Option<Grade>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.status == SubmissionStatus::Graded || self.grade.is_some()
    }

    pub fn is_owned_by(&self, student_id: i64) -> bool {
        self.student_id == student_id
    }
}
