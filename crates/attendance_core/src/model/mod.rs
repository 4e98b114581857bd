//! Domain model for subject attendance tracking.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep storage, flow and statistics code working on one record shape.
//!
//! # Invariants
//! - Every subject and record is identified by a stable UUID.
//! - Dates carry no time-of-day component.

pub mod record;
pub mod subject;
