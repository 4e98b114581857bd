//! Subject use-case service.
//!
//! # Responsibility
//! - Create, list and delete subjects for the signed-in owner.
//! - Assemble the subject detail view: history plus statistics.
//! - Delete individual attendance records from the history.
//!
//! # Invariants
//! - Subject names are validated before any write.
//! - History is sorted by date descending.
//! - Statistics are computed from the same snapshot shown in the history.

use crate::clock::Clock;
use crate::model::record::{AttendanceRecord, RecordId};
use crate::model::subject::{Subject, SubjectId, SubjectValidationError, UserId};
use crate::repo::record_repo::{AttendanceRepository, StatusFilter};
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use crate::service::flow_service::AttendanceFlowSession;
use crate::stats::{compute_stats, AttendanceStats, StatsConfig};
use chrono::Utc;
use log::warn;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for subject use-cases.
#[derive(Debug)]
pub enum SubjectServiceError {
    /// Name input rejected before any write.
    InvalidName(SubjectValidationError),
    SubjectNotFound(SubjectId),
    RecordNotFound(RecordId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for SubjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::RecordNotFound(id) => write!(f, "attendance record not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SubjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidName(err),
            RepoError::SubjectNotFound(id) => Self::SubjectNotFound(id),
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<SubjectValidationError> for SubjectServiceError {
    fn from(value: SubjectValidationError) -> Self {
        Self::InvalidName(value)
    }
}

/// Subject detail read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectDetail {
    pub subject: Subject,
    /// Full history, newest date first.
    pub records: Vec<AttendanceRecord>,
    pub stats: AttendanceStats,
}

/// Subject facade over repository implementations.
pub struct SubjectService<S: SubjectRepository, A: AttendanceRepository> {
    subjects: S,
    records: A,
    config: StatsConfig,
}

impl<S: SubjectRepository, A: AttendanceRepository> SubjectService<S, A> {
    pub fn new(subjects: S, records: A, config: StatsConfig) -> Self {
        Self {
            subjects,
            records,
            config,
        }
    }

    /// Creates one subject owned by `owner_id`.
    pub fn create_subject(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<Subject, SubjectServiceError> {
        let subject = Subject::new(owner_id, name, Utc::now().timestamp_millis())?;
        self.subjects.create_subject(&subject)?;
        Ok(subject)
    }

    /// Lists the owner's subjects, newest first.
    pub fn list_subjects(&self, owner_id: UserId) -> Result<Vec<Subject>, SubjectServiceError> {
        Ok(self.subjects.list_subjects(owner_id)?)
    }

    /// Gets one subject or fails with `SubjectNotFound`.
    pub fn get_subject(&self, id: SubjectId) -> Result<Subject, SubjectServiceError> {
        self.subjects
            .get_subject(id)?
            .ok_or(SubjectServiceError::SubjectNotFound(id))
    }

    /// Gets a subject only if `owner_id` owns it.
    ///
    /// Subjects of other owners report `SubjectNotFound`, same as missing ones.
    pub fn owned_subject(
        &self,
        owner_id: UserId,
        id: SubjectId,
    ) -> Result<Subject, SubjectServiceError> {
        let subject = self.get_subject(id)?;
        if subject.owner_id != owner_id {
            warn!("event=subject_access module=service status=error error_code=not_owner subject_id={id}");
            return Err(SubjectServiceError::SubjectNotFound(id));
        }
        Ok(subject)
    }

    /// Gets a record only if its subject belongs to `owner_id`.
    pub fn owned_record(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<AttendanceRecord, SubjectServiceError> {
        let record = self
            .records
            .get_record(id)?
            .ok_or(SubjectServiceError::RecordNotFound(id))?;
        match self.owned_subject(owner_id, record.subject_id) {
            Ok(_) => Ok(record),
            Err(SubjectServiceError::SubjectNotFound(_)) => {
                Err(SubjectServiceError::RecordNotFound(id))
            }
            Err(other) => Err(other),
        }
    }

    /// Loads subject, full history and statistics in one call.
    pub fn subject_detail(&self, id: SubjectId) -> Result<SubjectDetail, SubjectServiceError> {
        let subject = self.get_subject(id)?;
        let mut records = self.records.list_records(id, StatusFilter::All)?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        let stats = compute_stats(&records, &self.config);

        Ok(SubjectDetail {
            subject,
            records,
            stats,
        })
    }

    /// Starts an attendance-entry session for an existing subject.
    pub fn begin_attendance<C: Clock>(
        &self,
        subject_id: SubjectId,
        clock: C,
    ) -> Result<AttendanceFlowSession<&A, C>, SubjectServiceError> {
        self.get_subject(subject_id)?;
        Ok(AttendanceFlowSession::new(subject_id, &self.records, clock))
    }

    /// Deletes a subject and, through the store, all of its records.
    pub fn delete_subject(&self, id: SubjectId) -> Result<(), SubjectServiceError> {
        Ok(self.subjects.delete_subject(id)?)
    }

    /// Deletes one record from a subject's history.
    pub fn delete_record(&self, id: RecordId) -> Result<(), SubjectServiceError> {
        Ok(self.records.delete_record(id)?)
    }
}
