//! Attendance record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist flow outcomes as one record per subject per date.
//! - Serve record snapshots for history and statistics.
//!
//! # Invariants
//! - `upsert_record` is keyed on `(subject_id, date)`: a later write replaces
//!   status and flags but keeps the first write's `id` and `created_at`.
//! - Writes against an unknown subject fail with `SubjectNotFound` and leave
//!   storage unchanged.
//! - Read paths reject invalid persisted rows instead of masking them.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::record::{AttendanceOutcome, AttendanceRecord, AttendanceStatus, RecordId};
use crate::model::subject::SubjectId;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    subject_id,
    date,
    status,
    teacher_present,
    attendance_taken,
    created_at
FROM attendance_records";

/// Which statuses a record listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    All,
    /// Only `present` and `absent`, the rows statistics count.
    Countable,
}

/// Repository interface for attendance records.
pub trait AttendanceRepository {
    /// Creates or overwrites the record for `(subject_id, outcome.date)`.
    fn upsert_record(
        &self,
        subject_id: SubjectId,
        outcome: &AttendanceOutcome,
    ) -> RepoResult<AttendanceRecord>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<AttendanceRecord>>;
    /// Deletes one record by id.
    fn delete_record(&self, id: RecordId) -> RepoResult<()>;
    /// Lists records of one subject, newest date first.
    fn list_records(
        &self,
        subject_id: SubjectId,
        filter: StatusFilter,
    ) -> RepoResult<Vec<AttendanceRecord>>;
}

impl<T: AttendanceRepository + ?Sized> AttendanceRepository for &T {
    fn upsert_record(
        &self,
        subject_id: SubjectId,
        outcome: &AttendanceOutcome,
    ) -> RepoResult<AttendanceRecord> {
        (**self).upsert_record(subject_id, outcome)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<AttendanceRecord>> {
        (**self).get_record(id)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        (**self).delete_record(id)
    }

    fn list_records(
        &self,
        subject_id: SubjectId,
        filter: StatusFilter,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        (**self).list_records(subject_id, filter)
    }
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn upsert_record(
        &self,
        subject_id: SubjectId,
        outcome: &AttendanceOutcome,
    ) -> RepoResult<AttendanceRecord> {
        let tx = self.conn.unchecked_transaction()?;

        let subject_exists = tx
            .query_row(
                "SELECT 1 FROM subjects WHERE id = ?1;",
                [subject_id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();
        if !subject_exists {
            warn!(
                "event=record_upsert module=repo status=error error_code=subject_not_found subject_id={subject_id}"
            );
            return Err(RepoError::SubjectNotFound(subject_id));
        }

        let date = outcome.date.format(DATE_FORMAT).to_string();
        tx.execute(
            "INSERT INTO attendance_records (
                id,
                subject_id,
                date,
                status,
                teacher_present,
                attendance_taken,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (subject_id, date) DO UPDATE SET
                status = excluded.status,
                teacher_present = excluded.teacher_present,
                attendance_taken = excluded.attendance_taken;",
            params![
                Uuid::new_v4().to_string(),
                subject_id.to_string(),
                date.as_str(),
                outcome.status.as_str(),
                outcome.teacher_present.map(bool_to_int),
                outcome.attendance_taken.map(bool_to_int),
                Utc::now().timestamp_millis(),
            ],
        )?;

        let stored = tx.query_row(
            &format!("{RECORD_SELECT_SQL} WHERE subject_id = ?1 AND date = ?2;"),
            params![subject_id.to_string(), date.as_str()],
            RawRecord::from_row,
        )?;
        tx.commit()?;

        let record = stored.parse()?;
        info!(
            "event=record_upsert module=repo status=ok subject_id={} record_id={} date={} record_status={}",
            subject_id, record.id, record.date, record.status
        );
        Ok(record)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<AttendanceRecord>> {
        self.conn
            .query_row(
                &format!("{RECORD_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                RawRecord::from_row,
            )
            .optional()?
            .map(RawRecord::parse)
            .transpose()
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM attendance_records WHERE id = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            warn!("event=record_delete module=repo status=error error_code=not_found record_id={id}");
            return Err(RepoError::NotFound(id));
        }

        info!("event=record_delete module=repo status=ok record_id={id}");
        Ok(())
    }

    fn list_records(
        &self,
        subject_id: SubjectId,
        filter: StatusFilter,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE subject_id = ?1");
        if filter == StatusFilter::Countable {
            sql.push_str(" AND status IN ('present', 'absent')");
        }
        sql.push_str(" ORDER BY date DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([subject_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(RawRecord::from_row(row)?.parse()?);
        }

        debug!(
            "event=record_list module=repo status=ok subject_id={subject_id} filter={filter:?} count={}",
            records.len()
        );
        Ok(records)
    }
}

struct RawRecord {
    id: String,
    subject_id: String,
    date: String,
    status: String,
    teacher_present: Option<i64>,
    attendance_taken: Option<i64>,
    created_at: i64,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            subject_id: row.get("subject_id")?,
            date: row.get("date")?,
            status: row.get("status")?,
            teacher_present: row.get("teacher_present")?,
            attendance_taken: row.get("attendance_taken")?,
            created_at: row.get("created_at")?,
        })
    }

    fn parse(self) -> RepoResult<AttendanceRecord> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{}` in attendance_records.date",
                self.date
            ))
        })?;
        let status = AttendanceStatus::parse(&self.status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid status `{}` in attendance_records.status",
                self.status
            ))
        })?;

        Ok(AttendanceRecord {
            id: parse_uuid(&self.id, "attendance_records.id")?,
            subject_id: parse_uuid(&self.subject_id, "attendance_records.subject_id")?,
            date,
            status,
            teacher_present: parse_flag(self.teacher_present, "teacher_present")?,
            attendance_taken: parse_flag(self.attendance_taken, "attendance_taken")?,
            created_at: self.created_at,
        })
    }
}

fn parse_flag(value: Option<i64>, column: &str) -> RepoResult<Option<bool>> {
    match value {
        None => Ok(None),
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        Some(other) => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in attendance_records.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
