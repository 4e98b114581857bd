//! Attendance record domain model.
//!
//! # Responsibility
//! - Define the canonical persisted unit of attendance state.
//! - Define the terminal outcome produced by the attendance-entry flow.
//!
//! # Invariants
//! - At most one record exists per `(subject_id, date)` pair.
//! - `teacher_present` is only set for outcomes that went through the
//!   "teacher present?" question; `attendance_taken` only for the
//!   teacher-absent branch.
//! - Only `Present` and `Absent` count toward the attendance percentage.

use super::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one attendance record, assigned by the store.
pub type RecordId = Uuid;

/// Attendance state recorded for one subject on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Class took place and the student attended.
    Present,
    /// Class took place and the student missed it.
    Absent,
    /// College was off.
    Holiday,
    /// Teacher was absent and no attendance was taken.
    NoClass,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Holiday,
        AttendanceStatus::NoClass,
    ];

    /// Returns whether this status counts toward the attendance percentage.
    pub fn is_countable(self) -> bool {
        matches!(self, Self::Present | Self::Absent)
    }

    /// Stable storage/wire name (`present|absent|holiday|no_class`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Holiday => "holiday",
            Self::NoClass => "no_class",
        }
    }

    /// Parses the stable storage/wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "holiday" => Some(Self::Holiday),
            "no_class" => Some(Self::NoClass),
            _ => None,
        }
    }

    /// Human-readable label used by history views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Holiday => "Holiday",
            Self::NoClass => "No Class",
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one completed attendance-entry flow.
///
/// This is exactly the payload handed to the record store; the store adds
/// identity and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceOutcome {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub teacher_present: Option<bool>,
    pub attendance_taken: Option<bool>,
}

impl AttendanceOutcome {
    /// College was off on `date`.
    pub fn holiday(date: NaiveDate) -> Self {
        Self {
            date,
            status: AttendanceStatus::Holiday,
            teacher_present: None,
            attendance_taken: None,
        }
    }

    /// Teacher absent and no attendance taken on `date`.
    pub fn no_class(date: NaiveDate) -> Self {
        Self {
            date,
            status: AttendanceStatus::NoClass,
            teacher_present: Some(false),
            attendance_taken: Some(false),
        }
    }
}

/// Canonical persisted attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub subject_id: SubjectId,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub teacher_present: Option<bool>,
    pub attendance_taken: Option<bool>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl AttendanceRecord {
    /// Returns the flow outcome this record stores.
    pub fn outcome(&self) -> AttendanceOutcome {
        AttendanceOutcome {
            date: self.date,
            status: self.status,
            teacher_present: self.teacher_present,
            attendance_taken: self.attendance_taken,
        }
    }
}
