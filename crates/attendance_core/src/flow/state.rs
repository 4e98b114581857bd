//! Attendance-entry state machine.
//!
//! # Responsibility
//! - Turn a sequence of yes/no and date decisions into exactly one
//!   `AttendanceOutcome`.
//! - Stay independent of rendering and persistence so every path can be
//!   unit-tested.
//!
//! # Invariants
//! - `transition` is pure: same `(state, input, today)` gives same result.
//! - Each terminal outcome is reachable by exactly one input path.
//! - A rejected input never advances the machine.
//! - Dates after `today` are rejected at `SelectDate`.

use crate::model::record::{AttendanceOutcome, AttendanceStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Non-terminal states of the flow. `CollegeStatus` is the initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowState {
    /// "Is college on today?"
    #[default]
    CollegeStatus,
    /// "Which date?"
    SelectDate,
    /// "Was the teacher present?"
    TeacherPresent { date: NaiveDate },
    /// Teacher was absent: "was attendance still taken?"
    AttendanceTaken { date: NaiveDate },
    /// "Were you present or absent?" with flags carried from earlier answers.
    MarkAttendance {
        date: NaiveDate,
        teacher_present: bool,
        attendance_taken: Option<bool>,
    },
}

impl FlowState {
    /// Stable step name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollegeStatus => "college_status",
            Self::SelectDate => "select_date",
            Self::TeacherPresent { .. } => "teacher_present",
            Self::AttendanceTaken { .. } => "attendance_taken",
            Self::MarkAttendance { .. } => "mark_attendance",
        }
    }

    /// Date chosen so far, if the flow has reached date selection.
    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self {
            Self::CollegeStatus | Self::SelectDate => None,
            Self::TeacherPresent { date }
            | Self::AttendanceTaken { date }
            | Self::MarkAttendance { date, .. } => Some(*date),
        }
    }
}

/// Final answer on the `MarkAttendance` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkChoice {
    Present,
    Absent,
}

impl From<MarkChoice> for AttendanceStatus {
    fn from(value: MarkChoice) -> Self {
        match value {
            MarkChoice::Present => AttendanceStatus::Present,
            MarkChoice::Absent => AttendanceStatus::Absent,
        }
    }
}

/// One user decision fed into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", content = "value", rename_all = "snake_case")]
pub enum FlowInput {
    /// Answer to `CollegeStatus`: `true` when college is on.
    CollegeOn(bool),
    /// Answer to `SelectDate`. `None` means the user confirmed without a date.
    SelectDate(Option<NaiveDate>),
    /// Answer to `TeacherPresent`.
    TeacherPresent(bool),
    /// Answer to `AttendanceTaken`.
    AttendanceTaken(bool),
    /// Answer to `MarkAttendance`.
    Mark(MarkChoice),
}

impl FlowInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollegeOn(_) => "college_on",
            Self::SelectDate(_) => "select_date",
            Self::TeacherPresent(_) => "teacher_present",
            Self::AttendanceTaken(_) => "attendance_taken",
            Self::Mark(_) => "mark",
        }
    }
}

/// Result of one accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Flow continues at the given state.
    Next(FlowState),
    /// Flow reached a terminal outcome that must be written exactly once.
    Done(AttendanceOutcome),
}

/// Rejections produced by `transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    /// Date step confirmed without choosing a date.
    NoDateSelected,
    /// Chosen date lies after the current date.
    FutureDate { date: NaiveDate, today: NaiveDate },
    /// Input does not answer the question asked by the current state.
    UnexpectedInput {
        state: &'static str,
        input: &'static str,
    },
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDateSelected => write!(f, "no date selected"),
            Self::FutureDate { date, today } => write!(
                f,
                "cannot record attendance for {date}: it is after today ({today})"
            ),
            Self::UnexpectedInput { state, input } => {
                write!(f, "input `{input}` is not valid at step `{state}`")
            }
        }
    }
}

impl Error for FlowError {}

/// Applies one input to one state.
///
/// `today` bounds date selection and is also the date recorded for a
/// holiday, since the flow has not asked for a date at that point.
///
/// # Errors
/// - `NoDateSelected` / `FutureDate` from `SelectDate`.
/// - `UnexpectedInput` when `input` answers a different step.
pub fn transition(
    state: FlowState,
    input: FlowInput,
    today: NaiveDate,
) -> Result<Transition, FlowError> {
    use FlowInput as I;
    use FlowState as S;

    let next = match (state, input) {
        (S::CollegeStatus, I::CollegeOn(false)) => {
            Transition::Done(AttendanceOutcome::holiday(today))
        }
        (S::CollegeStatus, I::CollegeOn(true)) => Transition::Next(S::SelectDate),

        (S::SelectDate, I::SelectDate(None)) => return Err(FlowError::NoDateSelected),
        (S::SelectDate, I::SelectDate(Some(date))) => {
            if date > today {
                return Err(FlowError::FutureDate { date, today });
            }
            Transition::Next(S::TeacherPresent { date })
        }

        (S::TeacherPresent { date }, I::TeacherPresent(false)) => {
            Transition::Next(S::AttendanceTaken { date })
        }
        (S::TeacherPresent { date }, I::TeacherPresent(true)) => {
            Transition::Next(S::MarkAttendance {
                date,
                teacher_present: true,
                attendance_taken: None,
            })
        }

        (S::AttendanceTaken { date }, I::AttendanceTaken(false)) => {
            Transition::Done(AttendanceOutcome::no_class(date))
        }
        (S::AttendanceTaken { date }, I::AttendanceTaken(true)) => {
            Transition::Next(S::MarkAttendance {
                date,
                teacher_present: false,
                attendance_taken: Some(true),
            })
        }

        (
            S::MarkAttendance {
                date,
                teacher_present,
                attendance_taken,
            },
            I::Mark(choice),
        ) => Transition::Done(AttendanceOutcome {
            date,
            status: choice.into(),
            teacher_present: Some(teacher_present),
            attendance_taken,
        }),

        (state, input) => {
            return Err(FlowError::UnexpectedInput {
                state: state.name(),
                input: input.name(),
            })
        }
    };

    Ok(next)
}

/// Runs a whole input sequence from the initial state.
///
/// Stops at the first terminal outcome; any input left after it is rejected
/// so a path can never produce two writes.
pub fn run_to_outcome(
    inputs: &[FlowInput],
    today: NaiveDate,
) -> Result<Option<AttendanceOutcome>, FlowError> {
    let mut state = FlowState::CollegeStatus;
    for (index, input) in inputs.iter().enumerate() {
        match transition(state, *input, today)? {
            Transition::Next(next) => state = next,
            Transition::Done(outcome) => {
                if let Some(extra) = inputs.get(index + 1) {
                    return Err(FlowError::UnexpectedInput {
                        state: "finished",
                        input: extra.name(),
                    });
                }
                return Ok(Some(outcome));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::{run_to_outcome, transition, FlowError, FlowInput, FlowState, MarkChoice, Transition};
    use crate::model::record::{AttendanceOutcome, AttendanceStatus};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2024, 9, 16)
    }

    #[test]
    fn college_off_is_holiday_for_today() {
        let result = transition(FlowState::CollegeStatus, FlowInput::CollegeOn(false), today());
        assert_eq!(
            result,
            Ok(Transition::Done(AttendanceOutcome {
                date: today(),
                status: AttendanceStatus::Holiday,
                teacher_present: None,
                attendance_taken: None,
            }))
        );
    }

    #[test]
    fn teacher_absent_and_no_attendance_is_no_class() {
        let outcome = run_to_outcome(
            &[
                FlowInput::CollegeOn(true),
                FlowInput::SelectDate(Some(day(2024, 9, 10))),
                FlowInput::TeacherPresent(false),
                FlowInput::AttendanceTaken(false),
            ],
            today(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(outcome.status, AttendanceStatus::NoClass);
        assert_eq!(outcome.date, day(2024, 9, 10));
        assert_eq!(outcome.teacher_present, Some(false));
        assert_eq!(outcome.attendance_taken, Some(false));
    }

    #[test]
    fn teacher_present_path_carries_only_teacher_flag() {
        let outcome = run_to_outcome(
            &[
                FlowInput::CollegeOn(true),
                FlowInput::SelectDate(Some(today())),
                FlowInput::TeacherPresent(true),
                FlowInput::Mark(MarkChoice::Present),
            ],
            today(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(outcome.status, AttendanceStatus::Present);
        assert_eq!(outcome.teacher_present, Some(true));
        assert_eq!(outcome.attendance_taken, None);
    }

    #[test]
    fn teacher_absent_but_attendance_taken_carries_both_flags() {
        let outcome = run_to_outcome(
            &[
                FlowInput::CollegeOn(true),
                FlowInput::SelectDate(Some(day(2024, 9, 1))),
                FlowInput::TeacherPresent(false),
                FlowInput::AttendanceTaken(true),
                FlowInput::Mark(MarkChoice::Absent),
            ],
            today(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(outcome.status, AttendanceStatus::Absent);
        assert_eq!(outcome.teacher_present, Some(false));
        assert_eq!(outcome.attendance_taken, Some(true));
    }

    #[test]
    fn future_date_is_rejected_and_machine_stays_put() {
        let tomorrow = day(2024, 9, 17);
        let err = transition(FlowState::SelectDate, FlowInput::SelectDate(Some(tomorrow)), today())
            .unwrap_err();
        assert_eq!(
            err,
            FlowError::FutureDate {
                date: tomorrow,
                today: today()
            }
        );

        let accepted =
            transition(FlowState::SelectDate, FlowInput::SelectDate(Some(today())), today());
        assert_eq!(
            accepted,
            Ok(Transition::Next(FlowState::TeacherPresent { date: today() }))
        );
    }

    #[test]
    fn missing_date_is_a_validation_error() {
        assert_eq!(
            transition(FlowState::SelectDate, FlowInput::SelectDate(None), today()),
            Err(FlowError::NoDateSelected)
        );
    }

    #[test]
    fn mismatched_input_is_rejected() {
        let err = transition(
            FlowState::CollegeStatus,
            FlowInput::Mark(MarkChoice::Present),
            today(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FlowError::UnexpectedInput {
                state: "college_status",
                input: "mark"
            }
        );
    }

    #[test]
    fn input_after_terminal_outcome_is_rejected() {
        let err = run_to_outcome(
            &[FlowInput::CollegeOn(false), FlowInput::CollegeOn(true)],
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::UnexpectedInput { state: "finished", .. }));
    }

    #[test]
    fn each_terminal_outcome_has_exactly_one_path() {
        let date = Some(day(2024, 9, 2));
        let answers = [false, true];
        let marks = [MarkChoice::Present, MarkChoice::Absent];
        let mut paths: Vec<(AttendanceOutcome, Vec<FlowInput>)> = Vec::new();

        // Enumerate every input sequence the questions allow.
        for college in answers {
            let mut base = vec![FlowInput::CollegeOn(college)];
            if !college {
                let outcome = run_to_outcome(&base, today()).unwrap().unwrap();
                paths.push((outcome, base));
                continue;
            }
            base.push(FlowInput::SelectDate(date));
            for teacher in answers {
                let mut with_teacher = base.clone();
                with_teacher.push(FlowInput::TeacherPresent(teacher));
                let branches: Vec<Vec<FlowInput>> = if teacher {
                    vec![with_teacher]
                } else {
                    answers
                        .iter()
                        .map(|taken| {
                            let mut path = with_teacher.clone();
                            path.push(FlowInput::AttendanceTaken(*taken));
                            path
                        })
                        .collect()
                };
                for branch in branches {
                    if let Some(outcome) = run_to_outcome(&branch, today()).unwrap() {
                        paths.push((outcome, branch));
                        continue;
                    }
                    for mark in marks {
                        let mut path = branch.clone();
                        path.push(FlowInput::Mark(mark));
                        let outcome = run_to_outcome(&path, today()).unwrap().unwrap();
                        paths.push((outcome, path));
                    }
                }
            }
        }

        assert_eq!(paths.len(), 6);
        for (index, (outcome, _)) in paths.iter().enumerate() {
            let same = paths.iter().filter(|(other, _)| other == outcome).count();
            assert_eq!(same, 1, "outcome {index} reachable by more than one path");
        }
        for status in AttendanceStatus::ALL {
            assert!(paths.iter().any(|(outcome, _)| outcome.status == status));
        }
    }
}
