//! Core domain logic for the contact book.
//! This crate is the single source of truth for contact and group invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod panel;
pub mod registry;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::contact::{Contact, ContactId, ContactPatch};
pub use model::group::{Group, GroupId, GroupPatch};
pub use model::ModelError;
pub use panel::{ContactForm, ContactPanel, PanelError, PanelState};
pub use registry::contact_registry::{ContactExport, ContactRegistry};
pub use registry::group_registry::GroupRegistry;
pub use registry::{Entity, RegistryError, RegistryResult};
pub use storage::StorageAdapter;
pub use store::{KeyValueStore, MemoryStore, SqliteKvStore, StoreError, StoreResult};
pub use validation::{
    format_phone_number, validate_contact_name, validate_group_name, validate_phone_number,
    Field, ValidationError, ValidationResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
