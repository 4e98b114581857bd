//! Core domain logic for subject attendance tracking.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod db;
pub mod flow;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use flow::{
    run_to_outcome, transition, FlowError, FlowInput, FlowState, MarkChoice, Transition,
};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogLevel, LoggingOptions,
};
pub use model::record::{AttendanceOutcome, AttendanceRecord, AttendanceStatus, RecordId};
pub use model::subject::{Subject, SubjectId, SubjectValidationError, UserId};
pub use repo::record_repo::{AttendanceRepository, SqliteAttendanceRepository, StatusFilter};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::dashboard_service::{summarize_subjects, Dashboard, DashboardService, SubjectSummary};
pub use service::flow_service::{AttendanceFlowSession, FlowSessionError, FlowStep, SessionStatus};
pub use service::subject_service::{SubjectDetail, SubjectService, SubjectServiceError};
pub use stats::{
    compute_stats, AttendanceStats, StatsConfig, StatsConfigError, Zone, ZoneBands,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
