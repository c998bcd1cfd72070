//! Group domain model.
//!
//! # Responsibility
//! - Hold one named contact group.
//! - Read both the canonical record shape and the legacy presentation entry.
//!
//! # Invariants
//! - `name` satisfies `validate_group_name`.
//! - Rendered markup from legacy entries is never kept.

use crate::model::{has_id, id_or_generate, ModelError};
use crate::validation::validate_group_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable group identifier.
pub type GroupId = String;

/// Persisted group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
}

impl GroupPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupEntry {
    #[serde(rename_all = "camelCase")]
    Record {
        id: Option<String>,
        name: String,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    },
    /// `{ "value": <name>, "dom": <markup> }` written by the old UI. The
    /// markup key is ignored.
    Legacy { value: String },
}

impl Group {
    /// Builds a validated group, generating an id when none is given.
    pub fn new(id: Option<String>, name: &str) -> Result<Self, ModelError> {
        let name = validate_group_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: id_or_generate(id),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn update(&mut self, patch: &GroupPatch) -> Result<(), ModelError> {
        if let Some(name) = patch.name.as_deref() {
            self.name = validate_group_name(name)?;
        }
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
        Ok(())
    }

    /// Case-insensitive name comparison used for uniqueness checks.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Rebuilds a group from JSON. Accepts legacy `{value, dom}` entries.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        parse_group_entry(value).map(|(group, _)| group)
    }
}

/// Parses one stored group entry.
///
/// The flag is `true` when the entry got a freshly generated id, either
/// because it used the legacy shape or because its `id` was missing.
pub(crate) fn parse_group_entry(value: &Value) -> Result<(Group, bool), ModelError> {
    let entry =
        GroupEntry::deserialize(value).map_err(|err| ModelError::InvalidData(err.to_string()))?;
    match entry {
        GroupEntry::Record {
            id,
            name,
            created_at,
            updated_at,
        } => {
            let generated = !has_id(id.as_deref());
            let mut group = Group::new(id, &name)?;
            if let Some(created_at) = created_at {
                group.created_at = created_at;
            }
            group.updated_at = updated_at.unwrap_or(group.created_at);
            Ok((group, generated))
        }
        GroupEntry::Legacy { value } => Ok((Group::new(None, &value)?, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_group_entry, Group};
    use serde_json::json;

    #[test]
    fn legacy_entry_drops_markup_and_gets_fresh_id() {
        let (group, legacy) = parse_group_entry(&json!({
            "value": "Friends",
            "dom": "<div class=\"accordion__item\">Friends</div>"
        }))
        .unwrap();
        assert!(legacy);
        assert_eq!(group.name, "Friends");
        assert!(!group.id.is_empty());
        assert!(!group.to_json().to_string().contains("accordion"));
    }

    #[test]
    fn record_without_id_is_flagged_for_rewrite() {
        let (group, generated) = parse_group_entry(&json!({ "name": "Work" })).unwrap();
        assert!(generated);
        assert!(!group.id.is_empty());

        let (_, generated) = parse_group_entry(&json!({ "id": "g1", "name": "Work" })).unwrap();
        assert!(!generated);
    }

    #[test]
    fn has_name_ignores_case_and_surrounding_whitespace() {
        let group = Group::new(None, "Family").unwrap();
        assert!(group.has_name("  family "));
        assert!(!group.has_name("Families"));
    }
}
