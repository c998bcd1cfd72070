//! Contact registry.
//!
//! # Responsibility
//! - Create, update, delete, search and count contacts.
//! - Check group references through `GroupRegistry` at write time.
//! - Produce and consume the JSON export envelope.
//!
//! # Invariants
//! - Normalized phone numbers are unique across all contacts.
//! - A non-null `group_id` resolves to an existing group when assigned.
//! - Contacts whose group was deleted later are reported as ungrouped and
//!   stay editable without touching their `group_id`.
//! - Unreadable stored entries survive every write except `import_data`.

use crate::core_version;
use crate::model::contact::{parse_contact_entry, Contact, ContactPatch};
use crate::registry::group_registry::GroupRegistry;
use crate::registry::{report, Collection, Entity, RegistryError, RegistryResult};
use crate::storage::{keys, StorageAdapter};
use crate::store::KeyValueStore;
use crate::validation::{mask_phone, validate_phone_number};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Export envelope: `{ contacts, exportDate, version }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactExport {
    pub contacts: Vec<Contact>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

pub struct ContactRegistry<'a, S: KeyValueStore> {
    storage: &'a StorageAdapter<S>,
}

impl<'a, S: KeyValueStore> ContactRegistry<'a, S> {
    pub fn new(storage: &'a StorageAdapter<S>) -> Self {
        Self { storage }
    }

    fn groups(&self) -> GroupRegistry<'a, S> {
        GroupRegistry::new(self.storage)
    }

    /// Returns all readable contacts in persisted order.
    pub fn get_all(&self) -> Vec<Contact> {
        self.load().records
    }

    pub fn get_by_group(&self, group_id: &str) -> Vec<Contact> {
        self.get_all()
            .into_iter()
            .filter(|contact| contact.belongs_to(group_id))
            .collect()
    }

    /// Contacts of the group named `group_name`; empty when no such group.
    pub fn get_by_group_name(&self, group_name: &str) -> Vec<Contact> {
        match self.groups().find_by_name(group_name) {
            Some(group) => self.get_by_group(&group.id),
            None => Vec::new(),
        }
    }

    /// Contacts with no group or with a group that no longer exists.
    pub fn get_ungrouped(&self) -> Vec<Contact> {
        let group_ids: HashSet<String> = self
            .groups()
            .get_all()
            .into_iter()
            .map(|group| group.id)
            .collect();
        self.get_all()
            .into_iter()
            .filter(|contact| {
                contact
                    .group_id
                    .as_ref()
                    .map_or(true, |group_id| !group_ids.contains(group_id))
            })
            .collect()
    }

    /// Creates a contact. Returns `None` on invalid input, unknown group or
    /// duplicate phone.
    pub fn create(&self, name: &str, phone: &str, group_id: Option<&str>) -> Option<Contact> {
        report("contact_create", self.try_create(name, phone, group_id))
    }

    pub fn try_create(
        &self,
        name: &str,
        phone: &str,
        group_id: Option<&str>,
    ) -> RegistryResult<Contact> {
        if let Some(group_id) = group_id {
            self.require_group(group_id)?;
        }

        let contact = Contact::new(None, name, phone, group_id.map(str::to_string))?;
        let mut contacts = self.load();
        ensure_phone_free(&contacts.records, &contact.phone, None)?;

        contacts.records.push(contact.clone());
        self.persist(&contacts)?;
        info!(
            "event=contact_create module=registry status=ok contact_id={} phone={}",
            contact.id,
            mask_phone(&contact.phone)
        );
        Ok(contact)
    }

    /// Creates a contact in the group named `group_name`.
    pub fn create_by_group_name(
        &self,
        name: &str,
        phone: &str,
        group_name: &str,
    ) -> Option<Contact> {
        report(
            "contact_create",
            self.try_create_by_group_name(name, phone, group_name),
        )
    }

    pub fn try_create_by_group_name(
        &self,
        name: &str,
        phone: &str,
        group_name: &str,
    ) -> RegistryResult<Contact> {
        let group = self
            .groups()
            .find_by_name(group_name)
            .ok_or_else(|| RegistryError::not_found(Entity::Group, group_name.trim()))?;
        self.try_create(name, phone, Some(&group.id))
    }

    /// Applies `patch` to the contact with `id`.
    pub fn update(&self, id: &str, patch: &ContactPatch) -> Option<Contact> {
        report("contact_update", self.try_update(id, patch))
    }

    pub fn try_update(&self, id: &str, patch: &ContactPatch) -> RegistryResult<Contact> {
        let mut contacts = self.load();
        let index = contacts
            .records
            .iter()
            .position(|contact| contact.id == id)
            .ok_or_else(|| RegistryError::not_found(Entity::Contact, id))?;

        let mut updated = contacts.records[index].clone();
        if let Some(Some(group_id)) = &patch.group_id {
            if !updated.belongs_to(group_id) {
                self.require_group(group_id)?;
            }
        }

        updated.update(patch)?;
        if patch.phone.is_some() {
            ensure_phone_free(&contacts.records, &updated.phone, Some(id))?;
        }

        contacts.records[index] = updated.clone();
        self.persist(&contacts)?;
        info!("event=contact_update module=registry status=ok contact_id={id}");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> bool {
        report("contact_delete", self.try_delete(id)).is_some()
    }

    pub fn try_delete(&self, id: &str) -> RegistryResult<()> {
        let mut contacts = self.load();
        let before = contacts.records.len();
        contacts.records.retain(|contact| contact.id != id);
        if contacts.records.len() == before {
            return Err(RegistryError::not_found(Entity::Contact, id));
        }

        self.persist(&contacts)?;
        info!("event=contact_delete module=registry status=ok contact_id={id}");
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Contact> {
        self.get_all().into_iter().find(|contact| contact.id == id)
    }

    /// Finds a contact by phone. Any accepted spelling of the number matches.
    pub fn find_by_phone(&self, phone: &str) -> Option<Contact> {
        let normalized =
            validate_phone_number(phone).unwrap_or_else(|_| phone.trim().to_string());
        self.get_all()
            .into_iter()
            .find(|contact| contact.phone == normalized)
    }

    /// Case-insensitive substring search over names. An empty query matches
    /// every contact.
    pub fn search_by_name(&self, query: &str) -> Vec<Contact> {
        let needle = query.to_lowercase();
        self.get_all()
            .into_iter()
            .filter(|contact| contact.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }

    pub fn count_by_group(&self, group_id: &str) -> usize {
        self.get_all()
            .iter()
            .filter(|contact| contact.belongs_to(group_id))
            .count()
    }

    pub fn clear_all(&self) -> bool {
        self.storage.remove(keys::CONTACTS)
    }

    pub fn export_data(&self) -> ContactExport {
        ContactExport {
            contacts: self.get_all(),
            export_date: Utc::now(),
            version: core_version().to_string(),
        }
    }

    /// Replaces all contacts with the ones in an export envelope.
    ///
    /// Nothing is written unless every record validates and phones and ids
    /// are unique within the payload. Group references are not checked;
    /// unknown ones import as ungrouped. Stored entries that could not be
    /// read are replaced too.
    pub fn import_data(&self, payload: &Value) -> bool {
        report("contact_import", self.try_import_data(payload)).is_some()
    }

    /// Returns the number of imported contacts.
    pub fn try_import_data(&self, payload: &Value) -> RegistryResult<usize> {
        let records = payload
            .get("contacts")
            .and_then(Value::as_array)
            .ok_or_else(|| RegistryError::InvalidData("`contacts` must be an array".to_string()))?;

        let mut contacts: Vec<Contact> = Vec::with_capacity(records.len());
        let mut ids = HashSet::new();
        for record in records {
            let contact = Contact::from_json(record)?;
            if !ids.insert(contact.id.clone()) {
                return Err(RegistryError::conflict(
                    Entity::Contact,
                    format!("duplicate contact id `{}` in import", contact.id),
                ));
            }
            ensure_phone_free(&contacts, &contact.phone, None)?;
            contacts.push(contact);
        }

        let count = contacts.len();
        self.persist(&Collection::replacing(contacts))?;
        info!("event=contact_import module=registry status=ok count={count}");
        Ok(count)
    }

    fn require_group(&self, group_id: &str) -> RegistryResult<()> {
        match self.groups().find_by_id(group_id) {
            Some(_) => Ok(()),
            None => Err(RegistryError::not_found(Entity::Group, group_id)),
        }
    }

    fn load(&self) -> Collection<Contact> {
        let contacts = Collection::read(
            self.storage.load(keys::CONTACTS, Vec::new()),
            "contact_load",
            parse_contact_entry,
        );
        if contacts.needs_rewrite {
            let saved = self.storage.save(keys::CONTACTS, &contacts.entries());
            info!(
                "event=contact_id_backfill module=registry status={}",
                if saved { "ok" } else { "error" }
            );
        }
        contacts
    }

    fn persist(&self, contacts: &Collection<Contact>) -> RegistryResult<()> {
        if self.storage.save(keys::CONTACTS, &contacts.entries()) {
            Ok(())
        } else {
            Err(RegistryError::Storage(keys::CONTACTS))
        }
    }
}

fn ensure_phone_free(
    contacts: &[Contact],
    phone: &str,
    exclude_id: Option<&str>,
) -> RegistryResult<()> {
    let taken = contacts
        .iter()
        .any(|contact| contact.phone == phone && Some(contact.id.as_str()) != exclude_id);
    if taken {
        return Err(RegistryError::conflict(
            Entity::Contact,
            format!("phone {} already exists", mask_phone(phone)),
        ));
    }
    Ok(())
}
