//! Statistics engine.
//!
//! # Responsibility
//! - Pure functions from an in-memory record snapshot to aggregate metrics.
//! - No I/O, no caching: every call receives an immutable snapshot and
//!   returns a fresh result.

pub mod config;
pub mod engine;

pub use config::{
    StatsConfig, StatsConfigError, ZoneBands, DEFAULT_AVERAGE_FROM, DEFAULT_SAFE_FROM,
    DEFAULT_TARGET_THRESHOLD,
};
pub use engine::{
    attendance_percentage, classes_needed_for_threshold, compute_stats,
    compute_stats_from_statuses, zone_for, AttendanceStats, Zone,
};
