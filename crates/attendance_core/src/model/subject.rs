//! Subject domain model.
//!
//! # Responsibility
//! - Define the trackable course/class a user records attendance for.
//! - Own subject name normalization and validation.
//!
//! # Invariants
//! - `name` is trimmed and never empty.
//! - A subject belongs to exactly one owner.
//! - Deleting a subject deletes its attendance records (enforced by storage).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a subject.
pub type SubjectId = Uuid;

/// Identifier of the owning user, handed in by the session collaborator.
pub type UserId = Uuid;

/// Validation failures for subject input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectValidationError {
    /// Name is empty after trimming.
    EmptyName,
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "subject name cannot be empty"),
        }
    }
}

impl Error for SubjectValidationError {}

/// A trackable course/class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub owner_id: UserId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Subject {
    /// Creates a subject with a generated id and normalized name.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    pub fn new(
        owner_id: UserId,
        name: &str,
        created_at: i64,
    ) -> Result<Self, SubjectValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name: normalize_subject_name(name)?,
            created_at,
        })
    }

    /// Checks invariants on an already-constructed subject.
    pub fn validate(&self) -> Result<(), SubjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(SubjectValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Trims surrounding whitespace and rejects empty names.
pub fn normalize_subject_name(name: &str) -> Result<String, SubjectValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SubjectValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}
