use attendance_core::db::open_db_in_memory;
use attendance_core::{
    AttendanceFlowSession, AttendanceOutcome, AttendanceRecord, AttendanceRepository,
    AttendanceStatus, FixedClock, FlowError, FlowInput, FlowSessionError, FlowState, FlowStep,
    MarkChoice, RecordId, RepoError, RepoResult, SessionStatus, SqliteAttendanceRepository,
    SqliteSubjectRepository, StatsConfig, StatusFilter, Subject, SubjectId, SubjectRepository,
    SubjectService, SubjectServiceError,
};
use attendance_core::db::DbError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::cell::Cell;
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 16).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new(today())
}

fn seed_subject(conn: &Connection) -> Subject {
    let subject = Subject::new(Uuid::new_v4(), "Maths", 1).unwrap();
    SqliteSubjectRepository::new(conn)
        .create_subject(&subject)
        .unwrap();
    subject
}

/// Counts writes and fails the first `failures` of them.
struct FlakyRepository<'conn> {
    inner: SqliteAttendanceRepository<'conn>,
    failures: Cell<u32>,
    writes: Cell<u32>,
}

impl<'conn> FlakyRepository<'conn> {
    fn new(conn: &'conn Connection, failures: u32) -> Self {
        Self {
            inner: SqliteAttendanceRepository::new(conn),
            failures: Cell::new(failures),
            writes: Cell::new(0),
        }
    }
}

impl AttendanceRepository for FlakyRepository<'_> {
    fn upsert_record(
        &self,
        subject_id: SubjectId,
        outcome: &AttendanceOutcome,
    ) -> RepoResult<AttendanceRecord> {
        self.writes.set(self.writes.get() + 1);
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery)));
        }
        self.inner.upsert_record(subject_id, outcome)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<AttendanceRecord>> {
        self.inner.get_record(id)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        self.inner.delete_record(id)
    }

    fn list_records(
        &self,
        subject_id: SubjectId,
        filter: StatusFilter,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        self.inner.list_records(subject_id, filter)
    }
}

#[test]
fn teacher_absent_without_attendance_writes_one_no_class_record() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 0);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());
    let date = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();

    assert_eq!(
        session.submit(FlowInput::CollegeOn(true)).unwrap(),
        FlowStep::Continue(FlowState::SelectDate)
    );
    assert_eq!(
        session.submit(FlowInput::SelectDate(Some(date))).unwrap(),
        FlowStep::Continue(FlowState::TeacherPresent { date })
    );
    assert_eq!(
        session.submit(FlowInput::TeacherPresent(false)).unwrap(),
        FlowStep::Continue(FlowState::AttendanceTaken { date })
    );
    let FlowStep::Recorded(record) = session.submit(FlowInput::AttendanceTaken(false)).unwrap()
    else {
        panic!("expected terminal write");
    };

    assert_eq!(repo.writes.get(), 1);
    assert_eq!(record.status, AttendanceStatus::NoClass);
    assert_eq!(record.teacher_present, Some(false));
    assert_eq!(record.attendance_taken, Some(false));
    assert_eq!(record.date, date);
    assert!(matches!(session.status(), SessionStatus::Recorded(stored) if *stored == record));
    assert_eq!(session.state(), None);
}

#[test]
fn holiday_is_recorded_for_today_in_one_step() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 0);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());

    let FlowStep::Recorded(record) = session.submit(FlowInput::CollegeOn(false)).unwrap() else {
        panic!("expected terminal write");
    };
    assert_eq!(record.status, AttendanceStatus::Holiday);
    assert_eq!(record.date, today());
    assert_eq!(record.teacher_present, None);
    assert_eq!(record.attendance_taken, None);
}

#[test]
fn future_date_is_rejected_without_advancing() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 0);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());
    session.submit(FlowInput::CollegeOn(true)).unwrap();

    let tomorrow = today().succ_opt().unwrap();
    let err = session
        .submit(FlowInput::SelectDate(Some(tomorrow)))
        .unwrap_err();
    assert!(matches!(
        err,
        FlowSessionError::Flow(FlowError::FutureDate { date, .. }) if date == tomorrow
    ));
    assert_eq!(session.state(), Some(FlowState::SelectDate));

    let err = session.submit(FlowInput::SelectDate(None)).unwrap_err();
    assert!(matches!(err, FlowSessionError::Flow(FlowError::NoDateSelected)));
    assert_eq!(session.state(), Some(FlowState::SelectDate));
    assert_eq!(repo.writes.get(), 0);
}

#[test]
fn cancel_discards_selections_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 0);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());

    session.submit(FlowInput::CollegeOn(true)).unwrap();
    session.submit(FlowInput::SelectDate(Some(today()))).unwrap();
    session.submit(FlowInput::TeacherPresent(true)).unwrap();
    session.cancel().unwrap();

    assert_eq!(session.status(), &SessionStatus::Cancelled);
    assert!(matches!(
        session.submit(FlowInput::Mark(MarkChoice::Present)),
        Err(FlowSessionError::Closed)
    ));
    assert_eq!(repo.writes.get(), 0);
    assert!(repo
        .list_records(subject.id, StatusFilter::All)
        .unwrap()
        .is_empty());
}

#[test]
fn store_failure_keeps_decision_state_and_retry_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 1);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());

    session.submit(FlowInput::CollegeOn(true)).unwrap();
    session.submit(FlowInput::SelectDate(Some(today()))).unwrap();
    session.submit(FlowInput::TeacherPresent(false)).unwrap();
    session.submit(FlowInput::AttendanceTaken(true)).unwrap();
    let decision_state = session.state().unwrap();
    assert_eq!(
        decision_state,
        FlowState::MarkAttendance {
            date: today(),
            teacher_present: false,
            attendance_taken: Some(true),
        }
    );

    let err = session
        .submit(FlowInput::Mark(MarkChoice::Absent))
        .unwrap_err();
    assert!(matches!(err, FlowSessionError::Store(_)));
    assert_eq!(session.state(), Some(decision_state));

    let FlowStep::Recorded(record) = session.submit(FlowInput::Mark(MarkChoice::Absent)).unwrap()
    else {
        panic!("retry should write");
    };
    assert_eq!(record.status, AttendanceStatus::Absent);
    assert_eq!(record.teacher_present, Some(false));
    assert_eq!(record.attendance_taken, Some(true));
    assert_eq!(repo.writes.get(), 2);
    assert_eq!(
        repo.list_records(subject.id, StatusFilter::All).unwrap().len(),
        1
    );
}

#[test]
fn finished_session_rejects_further_input() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = FlakyRepository::new(&conn, 0);
    let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());

    session.submit(FlowInput::CollegeOn(false)).unwrap();
    assert!(matches!(
        session.submit(FlowInput::CollegeOn(false)),
        Err(FlowSessionError::Closed)
    ));
    assert!(matches!(session.cancel(), Err(FlowSessionError::Closed)));
    assert_eq!(repo.writes.get(), 1);
}

#[test]
fn remarking_a_date_through_two_sessions_overwrites() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let repo = SqliteAttendanceRepository::new(&conn);
    let inputs = |choice| {
        [
            FlowInput::CollegeOn(true),
            FlowInput::SelectDate(Some(today())),
            FlowInput::TeacherPresent(true),
            FlowInput::Mark(choice),
        ]
    };

    for choice in [MarkChoice::Absent, MarkChoice::Present] {
        let mut session = AttendanceFlowSession::new(subject.id, &repo, clock());
        for input in inputs(choice) {
            session.submit(input).unwrap();
        }
    }

    let records = repo.list_records(subject.id, StatusFilter::All).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Present);
}

#[test]
fn service_refuses_to_start_flow_for_missing_subject() {
    let conn = open_db_in_memory().unwrap();
    let service = SubjectService::new(
        SqliteSubjectRepository::new(&conn),
        SqliteAttendanceRepository::new(&conn),
        StatsConfig::default(),
    );

    let missing = Uuid::new_v4();
    let err = service.begin_attendance(missing, clock()).err().unwrap();
    assert!(matches!(err, SubjectServiceError::SubjectNotFound(id) if id == missing));
}

#[test]
fn subject_deleted_mid_flow_surfaces_not_found() {
    let conn = open_db_in_memory().unwrap();
    let subject = seed_subject(&conn);
    let service = SubjectService::new(
        SqliteSubjectRepository::new(&conn),
        SqliteAttendanceRepository::new(&conn),
        StatsConfig::default(),
    );
    let mut session = service.begin_attendance(subject.id, clock()).unwrap();
    session.submit(FlowInput::CollegeOn(true)).unwrap();

    SqliteSubjectRepository::new(&conn)
        .delete_subject(subject.id)
        .unwrap();

    session.submit(FlowInput::SelectDate(Some(today()))).unwrap();
    session.submit(FlowInput::TeacherPresent(true)).unwrap();
    let err = session
        .submit(FlowInput::Mark(MarkChoice::Present))
        .unwrap_err();
    assert!(matches!(
        err,
        FlowSessionError::Store(RepoError::SubjectNotFound(id)) if id == subject.id
    ));
}
