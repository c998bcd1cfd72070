//! Contact domain model.
//!
//! # Responsibility
//! - Hold one person record: display name, normalized phone, optional group.
//! - Apply partial updates with per-field validation.
//!
//! # Invariants
//! - `name` satisfies `validate_contact_name`.
//! - `phone` is in canonical `+7 (XXX) XXX-XX-XX` form.
//! - `updated_at` is refreshed on every successful mutation.
//! - A failed `update` leaves the contact unchanged.

use crate::model::{has_id, id_or_generate, ModelError};
use crate::validation::{validate_contact_name, validate_phone_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable contact identifier.
pub type ContactId = String;

/// Persisted contact record.
///
/// Serialized with camelCase keys (`groupId`, `createdAt`, `updatedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    /// `None` for ungrouped contacts. May point at a deleted group.
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a contact. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// `Some(None)` moves the contact out of its group.
    pub group_id: Option<Option<String>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.group_id.is_none()
    }
}

/// Wire shape accepted by `Contact::from_json`; timestamps may be absent in
/// hand-written or imported records.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRecord {
    id: Option<String>,
    name: String,
    phone: String,
    #[serde(default)]
    group_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Builds a validated contact.
    ///
    /// Generates a UUID v4 id when `id` is `None` or blank.
    ///
    /// # Errors
    /// - Returns `ModelError::Validation` when name or phone is invalid.
    pub fn new(
        id: Option<String>,
        name: &str,
        phone: &str,
        group_id: Option<String>,
    ) -> Result<Self, ModelError> {
        let name = validate_contact_name(name)?;
        let phone = validate_phone_number(phone)?;
        let now = Utc::now();
        Ok(Self {
            id: id_or_generate(id),
            name,
            phone,
            group_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update.
    ///
    /// All supplied fields are validated before any is written.
    pub fn update(&mut self, patch: &ContactPatch) -> Result<(), ModelError> {
        let name = patch
            .name
            .as_deref()
            .map(validate_contact_name)
            .transpose()?;
        let phone = patch
            .phone
            .as_deref()
            .map(validate_phone_number)
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(group_id) = &patch.group_id {
            self.group_id.clone_from(group_id);
        }
        self.touch();
        Ok(())
    }

    /// Returns whether this contact is assigned to `group_id`.
    pub fn belongs_to(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Rebuilds a contact from its JSON form, re-validating name and phone.
    ///
    /// Stored timestamps are kept; missing ones default to now.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        parse_contact_entry(value).map(|(contact, _)| contact)
    }

    fn touch(&mut self) {
        // Two updates inside one clock tick must still move forward.
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }
}

/// Parses one stored contact entry.
///
/// The flag is `true` when the entry had no usable `id` and got a generated
/// one.
pub(crate) fn parse_contact_entry(value: &Value) -> Result<(Contact, bool), ModelError> {
    let record =
        ContactRecord::deserialize(value).map_err(|err| ModelError::InvalidData(err.to_string()))?;
    let generated = !has_id(record.id.as_deref());
    let mut contact = Contact::new(
        record.id,
        &record.name,
        &record.phone,
        record.group_id.filter(|group_id| !group_id.is_empty()),
    )?;
    if let Some(created_at) = record.created_at {
        contact.created_at = created_at;
    }
    contact.updated_at = record.updated_at.unwrap_or(contact.created_at);
    Ok((contact, generated))
}
