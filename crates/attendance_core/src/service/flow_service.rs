//! Attendance-entry session.
//!
//! # Responsibility
//! - Feed user decisions into the flow state machine for one subject.
//! - Perform the single record upsert when the machine reaches a terminal
//!   outcome.
//!
//! # Invariants
//! - A session writes at most one record.
//! - On store failure the session stays in the state that produced the
//!   terminal decision, so the same decision can be re-submitted.
//! - Cancelling discards all selections and never touches the store.
//! - `&mut self` on `submit` means no new input is accepted while a write is
//!   in flight.

use crate::clock::Clock;
use crate::flow::{transition, FlowError, FlowInput, FlowState, Transition};
use crate::model::record::AttendanceRecord;
use crate::model::subject::SubjectId;
use crate::repo::record_repo::AttendanceRepository;
use crate::repo::RepoError;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the answer to `FlowState`.
    Active(FlowState),
    /// Terminal outcome persisted.
    Recorded(AttendanceRecord),
    /// Abandoned by the user before a terminal outcome.
    Cancelled,
}

/// What happened after one accepted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    /// Ask the next question.
    Continue(FlowState),
    /// Outcome written; the session is finished.
    Recorded(AttendanceRecord),
}

/// Session-level failures.
#[derive(Debug)]
pub enum FlowSessionError {
    /// Input rejected by the state machine; state unchanged.
    Flow(FlowError),
    /// Record store write failed; state unchanged, retry allowed.
    Store(RepoError),
    /// Session already recorded or cancelled.
    Closed,
}

impl Display for FlowSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flow(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "failed to save attendance: {err}"),
            Self::Closed => write!(f, "attendance session is already closed"),
        }
    }
}

impl Error for FlowSessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Flow(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Closed => None,
        }
    }
}

impl From<FlowError> for FlowSessionError {
    fn from(value: FlowError) -> Self {
        Self::Flow(value)
    }
}

/// Short-lived session that turns decisions into one persisted record.
pub struct AttendanceFlowSession<R: AttendanceRepository, C: Clock> {
    subject_id: SubjectId,
    repo: R,
    clock: C,
    status: SessionStatus,
}

impl<R: AttendanceRepository, C: Clock> AttendanceFlowSession<R, C> {
    /// Starts a session at the initial `CollegeStatus` question.
    pub fn new(subject_id: SubjectId, repo: R, clock: C) -> Self {
        debug!("event=flow_start module=flow status=ok subject_id={subject_id}");
        Self {
            subject_id,
            repo,
            clock,
            status: SessionStatus::Active(FlowState::default()),
        }
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Current question, or `None` once the session is closed.
    pub fn state(&self) -> Option<FlowState> {
        match self.status {
            SessionStatus::Active(state) => Some(state),
            SessionStatus::Recorded(_) | SessionStatus::Cancelled => None,
        }
    }

    /// Applies one decision, writing the record on a terminal transition.
    ///
    /// # Errors
    /// - `Flow` when the machine rejects the input.
    /// - `Store` when the upsert fails; re-submitting the same input retries.
    /// - `Closed` after the session was recorded or cancelled.
    pub fn submit(&mut self, input: FlowInput) -> Result<FlowStep, FlowSessionError> {
        let SessionStatus::Active(state) = self.status else {
            return Err(FlowSessionError::Closed);
        };

        let today = self.clock.today();
        let next = transition(state, input, today).map_err(|err| {
            debug!(
                "event=flow_transition module=flow status=rejected subject_id={} step={} input={} error={}",
                self.subject_id,
                state.name(),
                input.name(),
                err
            );
            err
        })?;

        match next {
            Transition::Next(next_state) => {
                debug!(
                    "event=flow_transition module=flow status=ok subject_id={} from={} to={}",
                    self.subject_id,
                    state.name(),
                    next_state.name()
                );
                self.status = SessionStatus::Active(next_state);
                Ok(FlowStep::Continue(next_state))
            }
            Transition::Done(outcome) => {
                let record = self
                    .repo
                    .upsert_record(self.subject_id, &outcome)
                    .map_err(|err| {
                        warn!(
                            "event=flow_complete module=flow status=error subject_id={} step={} error={}",
                            self.subject_id,
                            state.name(),
                            err
                        );
                        FlowSessionError::Store(err)
                    })?;

                info!(
                    "event=flow_complete module=flow status=ok subject_id={} record_id={} record_status={}",
                    self.subject_id, record.id, record.status
                );
                self.status = SessionStatus::Recorded(record.clone());
                Ok(FlowStep::Recorded(record))
            }
        }
    }

    /// Abandons the session without writing anything.
    ///
    /// # Errors
    /// - `Closed` when the session already finished.
    pub fn cancel(&mut self) -> Result<(), FlowSessionError> {
        let SessionStatus::Active(state) = self.status else {
            return Err(FlowSessionError::Closed);
        };
        info!(
            "event=flow_cancel module=flow status=ok subject_id={} step={}",
            self.subject_id,
            state.name()
        );
        self.status = SessionStatus::Cancelled;
        Ok(())
    }
}
