//! Attendance-entry workflow.
//!
//! # Responsibility
//! - Model the question sequence that ends in one attendance outcome as an
//!   explicit state enum with a single transition function.
//!
//! # See also
//! - `service::flow_service` for the session that persists the outcome.

pub mod state;

pub use state::{run_to_outcome, transition, FlowError, FlowInput, FlowState, MarkChoice, Transition};
