//! Group registry.
//!
//! # Responsibility
//! - Create, rename, delete and look up contact groups.
//! - Upgrade legacy `{value, dom}` group entries to canonical records.
//!
//! # Invariants
//! - Group names are unique under case-insensitive comparison.
//! - `get_all` keeps persisted (insertion) order.
//! - Deleting a group never touches contact records.
//! - Unreadable stored entries survive every rewrite.

use crate::model::group::{parse_group_entry, Group, GroupPatch};
use crate::registry::{report, Collection, Entity, RegistryError, RegistryResult};
use crate::storage::{keys, StorageAdapter};
use crate::store::KeyValueStore;
use log::info;

pub struct GroupRegistry<'a, S: KeyValueStore> {
    storage: &'a StorageAdapter<S>,
}

impl<'a, S: KeyValueStore> GroupRegistry<'a, S> {
    pub fn new(storage: &'a StorageAdapter<S>) -> Self {
        Self { storage }
    }

    /// Returns all readable groups in persisted order.
    ///
    /// Unreadable entries are skipped with a warning. When legacy or id-less
    /// entries are found the collection is rewritten in canonical form, so
    /// the ids assigned here stay stable for later calls.
    pub fn get_all(&self) -> Vec<Group> {
        self.load().records
    }

    /// Creates a group. Returns `None` on invalid or duplicate names.
    pub fn create(&self, name: &str) -> Option<Group> {
        report("group_create", self.try_create(name))
    }

    pub fn try_create(&self, name: &str) -> RegistryResult<Group> {
        let group = Group::new(None, name)?;
        let mut groups = self.load();
        if groups
            .records
            .iter().any(|existing| existing.has_name(&group.name)) {
            return Err(RegistryError::conflict(
                Entity::Group,
                format!("group `{}` already exists", group.name),
            ));
        }

        groups.records.push(group.clone());
        self.persist(&groups)?;
        info!(
            "event=group_create module=registry status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    /// Applies `patch` to the group with `id`.
    pub fn update(&self, id: &str, patch: &GroupPatch) -> Option<Group> {
        report("group_update", self.try_update(id, patch))
    }

    pub fn try_update(&self, id: &str, patch: &GroupPatch) -> RegistryResult<Group> {
        let mut groups = self.load();
        let index = groups
            .records
            .iter()
            .position(|group| group.id == id)
            .ok_or_else(|| RegistryError::not_found(Entity::Group, id))?;

        let mut updated = groups.records[index].clone();
        updated.update(patch)?;
        if groups
            .records
            .iter()
            .any(|other| other.id != id && other.has_name(&updated.name))
        {
            return Err(RegistryError::conflict(
                Entity::Group,
                format!("group `{}` already exists", updated.name),
            ));
        }

        groups.records[index] = updated.clone();
        self.persist(&groups)?;
        info!("event=group_update module=registry status=ok group_id={id}");
        Ok(updated)
    }

    /// Deletes the group with `id`. Member contacts keep their `group_id`.
    pub fn delete(&self, id: &str) -> bool {
        report("group_delete", self.try_delete(id)).is_some()
    }

    pub fn try_delete(&self, id: &str) -> RegistryResult<()> {
        let mut groups = self.load();
        let before = groups.records.len();
        groups.records.retain(|group| group.id != id);
        if groups.records.len() == before {
            return Err(RegistryError::not_found(Entity::Group, id));
        }

        self.persist(&groups)?;
        info!("event=group_delete module=registry status=ok group_id={id}");
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Group> {
        self.get_all().into_iter().find(|group| group.id == id)
    }

    /// Case-insensitive exact match on the trimmed `name`.
    pub fn find_by_name(&self, name: &str) -> Option<Group> {
        self.get_all().into_iter().find(|group| group.has_name(name))
    }

    /// Removes the group collection and the legacy presentation caches.
    pub fn clear_all(&self) -> bool {
        [
            keys::GROUPS,
            keys::LEGACY_OPTION_GROUPS,
            keys::LEGACY_ACCORDION_GROUPS,
        ]
        .into_iter()
        .fold(true, |ok, key| self.storage.remove(key) && ok)
    }

    fn load(&self) -> Collection<Group> {
        let groups = Collection::read(
            self.storage.load(keys::GROUPS, Vec::new()),
            "group_load",
            parse_group_entry,
        );
        if groups.needs_rewrite {
            let upgraded = self.storage.save(keys::GROUPS, &groups.entries());
            info!(
                "event=group_upgrade module=registry status={} count={}",
                if upgraded { "ok" } else { "error" },
                groups.records.len()
            );
        }
        groups
    }

    fn persist(&self, groups: &Collection<Group>) -> RegistryResult<()> {
        if self.storage.save(keys::GROUPS, &groups.entries()) {
            Ok(())
        } else {
            Err(RegistryError::Storage(keys::GROUPS))
        }
    }
}
