//! Registries: CRUD authorities for groups and contacts.
//!
//! # Responsibility
//! - Enforce cross-record rules (unique group names, unique phones, group
//!   references) on top of per-field model validation.
//! - Run every operation as reload, mutate, rewrite against the adapter.
//!
//! # Invariants
//! - No in-memory state survives between calls; the store is authoritative.
//! - A rewrite never drops stored entries this build cannot read.
//! - Plain-named operations (`create`, `update`, ...) never fail loudly: they
//!   log the reason and return `None`/`false`. `try_*` variants return the
//!   `RegistryError` to callers that need the reason.

use crate::model::ModelError;
use crate::validation::ValidationError;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contact_registry;
pub mod group_registry;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Entity kind referenced by `NotFound` and `Conflict` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Contact,
    Group,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Contact => "contact",
            Self::Group => "group",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Validation(ValidationError),
    /// A stored or imported record could not be read.
    InvalidData(String),
    /// `key` is an id, or a group name for name lookups.
    NotFound { entity: Entity, key: String },
    /// Duplicate group name or phone number.
    Conflict { entity: Entity, reason: String },
    /// The adapter refused the write.
    Storage(&'static str),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict { entity, reason } => write!(f, "{entity} conflict: {reason}"),
            Self::Storage(key) => write!(f, "failed to persist `{key}`"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ModelError> for RegistryError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::Validation(err) => Self::Validation(err),
            ModelError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

impl RegistryError {
    fn not_found(entity: Entity, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    fn conflict(entity: Entity, reason: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            reason: reason.into(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::InvalidData(_) => "invalid_data",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Storage(_) => "storage_failed",
        }
    }
}

/// Logs a failed registry operation and collapses the result to `Option`.
fn report<T>(event: &str, result: RegistryResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "event={event} module=registry status=error error_code={} error={err}",
                err.code()
            );
            None
        }
    }
}

/// Records read from one collection key.
pub(crate) struct Collection<T> {
    pub(crate) records: Vec<T>,
    /// Entries that failed to parse, kept as stored.
    pub(crate) unreadable: Vec<Value>,
    /// A record was upgraded or given a generated id while reading.
    pub(crate) needs_rewrite: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum StoredEntry<'a, T> {
    Record(&'a T),
    Raw(&'a Value),
}

impl<T> Collection<T> {
    /// Parses every entry. `parse` returns the record and whether it must be
    /// rewritten to keep its id stable.
    pub(crate) fn read(
        entries: Vec<Value>,
        event: &str,
        parse: impl Fn(&Value) -> Result<(T, bool), ModelError>,
    ) -> Self {
        let mut collection = Self {
            records: Vec::with_capacity(entries.len()),
            unreadable: Vec::new(),
            needs_rewrite: false,
        };
        for (index, entry) in entries.into_iter().enumerate() {
            match parse(&entry) {
                Ok((record, rewrite)) => {
                    collection.needs_rewrite |= rewrite;
                    collection.records.push(record);
                }
                Err(err) => {
                    warn!(
                        "event={event} module=registry status=unreadable index={index} error={err}"
                    );
                    collection.unreadable.push(entry);
                }
            }
        }
        collection
    }

    /// A collection that replaces everything stored, leftovers included.
    pub(crate) fn replacing(records: Vec<T>) -> Self {
        Self {
            records,
            unreadable: Vec::new(),
            needs_rewrite: false,
        }
    }

    /// Readable records first, then unreadable entries unchanged.
    pub(crate) fn entries(&self) -> Vec<StoredEntry<'_, T>> {
        self.records
            .iter()
            .map(StoredEntry::Record)
            .chain(self.unreadable.iter().map(StoredEntry::Raw))
            .collect()
    }
}
