//! Subject repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create, read, list and delete subjects for one owner.
//!
//! # Invariants
//! - `create_subject` validates before any SQL mutation.
//! - `delete_subject` removes the subject's attendance records in the same
//!   statement through `ON DELETE CASCADE`.
//! - Lists are ordered newest first.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::subject::{Subject, SubjectId, UserId};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SUBJECT_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    created_at
FROM subjects";

/// Repository interface for subject operations.
pub trait SubjectRepository {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list_subjects(&self, owner_id: UserId) -> RepoResult<Vec<Subject>>;
    fn delete_subject(&self, id: SubjectId) -> RepoResult<()>;
}

impl<T: SubjectRepository + ?Sized> SubjectRepository for &T {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        (**self).create_subject(subject)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        (**self).get_subject(id)
    }

    fn list_subjects(&self, owner_id: UserId) -> RepoResult<Vec<Subject>> {
        (**self).list_subjects(owner_id)
    }

    fn delete_subject(&self, id: SubjectId) -> RepoResult<()> {
        (**self).delete_subject(id)
    }
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        subject.validate()?;

        self.conn.execute(
            "INSERT INTO subjects (id, owner_id, name, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                subject.id.to_string(),
                subject.owner_id.to_string(),
                subject.name.as_str(),
                subject.created_at,
            ],
        )?;

        info!(
            "event=subject_create module=repo status=ok subject_id={}",
            subject.id
        );
        Ok(subject.id)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let row = self
            .conn
            .query_row(
                &format!("{SUBJECT_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                RawSubject::from_row,
            )
            .optional()?;

        row.map(RawSubject::parse).transpose()
    }

    fn list_subjects(&self, owner_id: UserId) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;

        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(RawSubject::from_row(row)?.parse()?);
        }

        Ok(subjects)
    }

    fn delete_subject(&self, id: SubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            warn!("event=subject_delete module=repo status=error error_code=not_found subject_id={id}");
            return Err(RepoError::SubjectNotFound(id));
        }

        info!("event=subject_delete module=repo status=ok subject_id={id}");
        Ok(())
    }
}

struct RawSubject {
    id: String,
    owner_id: String,
    name: String,
    created_at: i64,
}

impl RawSubject {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    fn parse(self) -> RepoResult<Subject> {
        let subject = Subject {
            id: parse_uuid(&self.id, "subjects.id")?,
            owner_id: parse_uuid(&self.owner_id, "subjects.owner_id")?,
            name: self.name,
            created_at: self.created_at,
        };
        subject
            .validate()
            .map_err(|err| RepoError::InvalidData(format!("{err} in subjects.name")))?;
        Ok(subject)
    }
}
