//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record-store and subject-store contracts the core depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Subject writes must pass `Subject::validate()` before persistence.
//! - At most one attendance record exists per `(subject_id, date)`; writes
//!   are upserts keyed on that pair.
//! - Repository APIs return semantic errors (`NotFound`, `SubjectNotFound`)
//!   in addition to DB transport errors.

use crate::db::DbError;
use crate::model::record::RecordId;
use crate::model::subject::{SubjectId, SubjectValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod record_repo;
pub mod subject_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for subject and attendance persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(SubjectValidationError),
    Db(DbError),
    /// Attendance record does not exist.
    NotFound(RecordId),
    /// Referenced subject does not exist (or was deleted meanwhile).
    SubjectNotFound(SubjectId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "attendance record not found: {id}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::SubjectNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<SubjectValidationError> for RepoError {
    fn from(value: SubjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
