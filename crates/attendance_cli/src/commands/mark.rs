//! The `attendance mark` command.
//!
//! Answers are given up front as flags and fed to the attendance flow one
//! question at a time; the flow decides which of them are needed.

use anyhow::{bail, Result};
use attendance_core::{
    Clock, FlowInput, FlowState, FlowStep, MarkChoice, SubjectId, SystemClock,
};
use chrono::NaiveDate;
use clap::ValueEnum;

use super::records::format_record;
use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollegeArg {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn as_bool(self) -> bool {
        self == Self::Yes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkArg {
    Present,
    Absent,
}

impl From<MarkArg> for MarkChoice {
    fn from(value: MarkArg) -> Self {
        match value {
            MarkArg::Present => Self::Present,
            MarkArg::Absent => Self::Absent,
        }
    }
}

/// Pre-supplied answers to the flow's questions.
#[derive(Debug, Clone, Copy)]
pub struct Answers {
    pub college: CollegeArg,
    pub date: Option<NaiveDate>,
    pub teacher: Option<YesNo>,
    pub taken: Option<YesNo>,
    pub status: Option<MarkArg>,
}

impl Answers {
    /// A college-off day is always recorded as a holiday for today, so any
    /// answer to a later question would be dropped.
    fn check(&self) -> Result<()> {
        if self.college == CollegeArg::On {
            return Ok(());
        }
        let unused: Vec<&str> = [
            ("--date", self.date.is_some()),
            ("--teacher", self.teacher.is_some()),
            ("--taken", self.taken.is_some()),
            ("--status", self.status.is_some()),
        ]
        .into_iter()
        .filter_map(|(flag, given)| given.then_some(flag))
        .collect();
        if !unused.is_empty() {
            bail!(
                "--college off records a holiday for today; drop {}",
                unused.join(", ")
            );
        }
        Ok(())
    }
}

pub fn execute(ctx: &Context, subject_id: SubjectId, answers: Answers) -> Result<()> {
    answers.check()?;
    let service = ctx.subject_service();
    let subject = service.owned_subject(ctx.owner()?, subject_id)?;
    let clock = SystemClock;
    let today = clock.today();
    let mut session = service.begin_attendance(subject_id, clock)?;

    while let Some(state) = session.state() {
        let input = match next_input(state, &answers, today) {
            Ok(input) => input,
            Err(err) => {
                session.cancel()?;
                return Err(err);
            }
        };
        if let FlowStep::Recorded(record) = session.submit(input)? {
            println!("{}: {}", subject.name, format_record(&record));
            return Ok(());
        }
    }
    Ok(())
}

fn next_input(state: FlowState, answers: &Answers, today: NaiveDate) -> Result<FlowInput> {
    let input = match state {
        FlowState::CollegeStatus => FlowInput::CollegeOn(answers.college == CollegeArg::On),
        FlowState::SelectDate => FlowInput::SelectDate(Some(answers.date.unwrap_or(today))),
        FlowState::TeacherPresent { date } => match answers.teacher {
            Some(answer) => FlowInput::TeacherPresent(answer.as_bool()),
            None => bail!("--teacher yes|no is required to mark {date}"),
        },
        FlowState::AttendanceTaken { date } => match answers.taken {
            Some(answer) => FlowInput::AttendanceTaken(answer.as_bool()),
            None => bail!("the teacher was absent on {date}; --taken yes|no is required"),
        },
        FlowState::MarkAttendance { date, .. } => match answers.status {
            Some(choice) => FlowInput::Mark(choice.into()),
            None => bail!("--status present|absent is required to mark {date}"),
        },
    };
    Ok(input)
}
