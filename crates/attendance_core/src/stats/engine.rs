//! Attendance statistics and threshold projection.
//!
//! # Responsibility
//! - Derive percentage, zone and "classes needed" from a record snapshot.
//!
//! # Invariants
//! - Computation is total: every finite record set (including the empty
//!   one) yields a result, and input order never matters.
//! - Only `present`/`absent` records count toward the percentage.
//! - `total = 0` yields percentage `0`, no zone and `0` classes needed.

use super::config::{StatsConfig, ZoneBands};
use crate::model::record::{AttendanceRecord, AttendanceStatus};
use serde::{Deserialize, Serialize};

/// Qualitative risk band derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Safe,
    Average,
    Danger,
}

impl Zone {
    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Average => "Average",
            Self::Danger => "Danger",
        }
    }

    /// One-letter badge shown next to compact percentages.
    pub fn badge(self) -> char {
        match self {
            Self::Safe => 'S',
            Self::Average => 'A',
            Self::Danger => 'D',
        }
    }
}

/// Statistics snapshot for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    /// Countable classes (`present + absent`).
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    /// `round(100 * present / total)`, half rounded up; `0` when `total = 0`.
    pub percentage: u32,
    /// `None` when `percentage = 0`.
    pub zone: Option<Zone>,
    pub holiday_count: u32,
    pub no_class_count: u32,
    /// Additional attended classes required to reach the target threshold.
    pub classes_needed: u32,
}

impl AttendanceStats {
    pub fn has_countable_classes(&self) -> bool {
        self.total > 0
    }
}

/// Computes statistics from a record snapshot.
pub fn compute_stats<'a, I>(records: I, config: &StatsConfig) -> AttendanceStats
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    compute_stats_from_statuses(records.into_iter().map(|record| record.status), config)
}

/// Computes statistics from bare statuses.
///
/// Used when the caller only fetched the `status` column.
pub fn compute_stats_from_statuses<I>(statuses: I, config: &StatsConfig) -> AttendanceStats
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut present = 0u32;
    let mut absent = 0u32;
    let mut holiday_count = 0u32;
    let mut no_class_count = 0u32;

    for status in statuses {
        match status {
            AttendanceStatus::Present => present += 1,
            AttendanceStatus::Absent => absent += 1,
            AttendanceStatus::Holiday => holiday_count += 1,
            AttendanceStatus::NoClass => no_class_count += 1,
        }
    }

    let total = present + absent;
    let percentage = attendance_percentage(present, total);

    AttendanceStats {
        total,
        present,
        absent,
        percentage,
        zone: zone_for(percentage, &config.bands()),
        holiday_count,
        no_class_count,
        classes_needed: classes_needed_for_threshold(present, total, config.target_threshold()),
    }
}

/// Whole-number attendance percentage, half rounded up.
///
/// Returns `0` when `total = 0`. Callers must keep `present <= total`.
pub fn attendance_percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let present = u64::from(present.min(total));
    let total = u64::from(total);
    // floor(100p/t + 1/2) in integers.
    ((200 * present + total) / (2 * total)) as u32
}

/// Bands a percentage into a zone; `0` gets no zone so no badge is shown.
pub fn zone_for(percentage: u32, bands: &ZoneBands) -> Option<Zone> {
    if percentage == 0 {
        None
    } else if percentage >= bands.safe_from {
        Some(Zone::Safe)
    } else if percentage >= bands.average_from {
        Some(Zone::Average)
    } else {
        Some(Zone::Danger)
    }
}

/// Minimum extra attended classes `x` with `(present + x) / (total + x) >= threshold`.
///
/// Best-case projection: every additional class is attended. Returns `0`
/// when `total = 0` or the rounded percentage already meets
/// `round(100 * threshold)`. `threshold` must lie in `(0, 1)`; values outside
/// that range yield `0`.
pub fn classes_needed_for_threshold(present: u32, total: u32, threshold: f64) -> u32 {
    if total == 0 || !(threshold > 0.0 && threshold < 1.0) {
        return 0;
    }
    let present = present.min(total);
    if f64::from(attendance_percentage(present, total)) >= (threshold * 100.0).round() {
        return 0;
    }

    let present = present as f64;
    let total = total as f64;
    let meets = |extra: f64| present + extra >= threshold * (total + extra) - 1e-9;

    let closed_form = ((threshold * total - present) / (1.0 - threshold)).ceil();
    let mut needed = if closed_form.is_finite() {
        closed_form.max(0.0)
    } else {
        0.0
    };

    // Closed form can be off by one around exact ratios due to float error.
    while needed > 0.0 && meets(needed - 1.0) {
        needed -= 1.0;
    }
    while !meets(needed) && needed < f64::from(u32::MAX) {
        needed += 1.0;
    }

    needed.min(f64::from(u32::MAX)) as u32
}
