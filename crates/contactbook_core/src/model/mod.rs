//! Contact book domain model.
//!
//! # Responsibility
//! - Define the `Contact` and `Group` records persisted by the registries.
//! - Enforce field validation at construction and on every mutation.
//!
//! # Invariants
//! - A constructed model always holds validated, normalized fields.
//! - Ids are immutable once assigned.
//! - Models carry semantic fields only; no presentation markup.

use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contact;
pub mod group;

/// Errors raised while building or mutating a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    Validation(ValidationError),
    /// Serialized record does not have the expected shape.
    InvalidData(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid record: {message}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for ModelError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Whether `id` is a usable identifier.
pub(crate) fn has_id(id: Option<&str>) -> bool {
    id.is_some_and(|id| !id.trim().is_empty())
}

/// Returns `id` when it is a usable identifier, or a fresh UUID v4 string.
pub(crate) fn id_or_generate(id: Option<String>) -> String {
    match id {
        Some(id) if has_id(Some(&id)) => id,
        _ => uuid::Uuid::new_v4().to_string(),
    }
}
