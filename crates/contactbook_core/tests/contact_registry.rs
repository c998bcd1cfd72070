mod common;

use common::UnavailableStore;
use contactbook_core::db::open_db_in_memory;
use contactbook_core::storage::keys;
use contactbook_core::{
    ContactPatch, ContactRegistry, Entity, GroupRegistry, KeyValueStore, MemoryStore,
    RegistryError, SqliteKvStore, StorageAdapter,
};
use serde_json::json;

fn with_registries<F>(test: F)
where
    F: FnOnce(&GroupRegistry<'_, SqliteKvStore<'_>>, &ContactRegistry<'_, SqliteKvStore<'_>>),
{
    let conn = open_db_in_memory().unwrap();
    let storage = StorageAdapter::new(SqliteKvStore::new(&conn));
    let groups = GroupRegistry::new(&storage);
    let contacts = ContactRegistry::new(&storage);
    test(&groups, &contacts);
}

#[test]
fn create_then_find_by_id_roundtrip() {
    with_registries(|groups, contacts| {
        let family = groups.create("Family").unwrap();
        let cases = [
            ("Anna Maria", "89991234567", "+7 (999) 123-45-67"),
            ("Пётр", "+7 916 111 22 33", "+7 (916) 111-22-33"),
            ("O'Brien", "9031234567", "+7 (903) 123-45-67"),
        ];

        for (name, phone, normalized) in cases {
            let created = contacts.create(name, phone, Some(&family.id)).unwrap();
            let loaded = contacts.find_by_id(&created.id).unwrap();
            assert_eq!(loaded, created);
            assert_eq!(loaded.name, name);
            assert_eq!(loaded.phone, normalized);
            assert_eq!(loaded.group_id.as_deref(), Some(family.id.as_str()));
        }
        assert_eq!(contacts.count(), 3);
    });
}

#[test]
fn create_without_group_is_allowed() {
    with_registries(|_, contacts| {
        let contact = contacts.create("Anna", "89991234567", None).unwrap();
        assert_eq!(contact.group_id, None);
        assert_eq!(contacts.get_ungrouped().len(), 1);
    });
}

#[test]
fn create_with_unknown_group_fails() {
    with_registries(|_, contacts| {
        assert!(contacts.create("Anna", "89991234567", Some("ghost")).is_none());
        assert_eq!(
            contacts
                .try_create("Anna", "89991234567", Some("ghost"))
                .unwrap_err(),
            RegistryError::NotFound {
                entity: Entity::Group,
                key: "ghost".to_string()
            }
        );
        assert_eq!(contacts.count(), 0);
    });
}

#[test]
fn create_with_invalid_fields_fails() {
    with_registries(|_, contacts| {
        assert!(contacts.create("A", "89991234567", None).is_none());
        assert!(contacts.create("Anna", "12345", None).is_none());
        assert!(matches!(
            contacts.try_create("Anna", "12345", None).unwrap_err(),
            RegistryError::Validation(_)
        ));
        assert_eq!(contacts.count(), 0);
    });
}

#[test]
fn duplicate_normalized_phone_is_rejected() {
    with_registries(|_, contacts| {
        contacts.create("Anna", "89991234567", None).unwrap();
        assert!(contacts.create("Maria", "+7 (999) 123-45-67", None).is_none());
        assert!(contacts.create("Maria", "999 123 45 67", None).is_none());
        assert!(matches!(
            contacts.try_create("Maria", "79991234567", None).unwrap_err(),
            RegistryError::Conflict {
                entity: Entity::Contact,
                ..
            }
        ));
        assert_eq!(contacts.count(), 1);
    });
}

#[test]
fn create_by_group_name_resolves_group() {
    with_registries(|groups, contacts| {
        let family = groups.create("Family").unwrap();

        let contact = contacts
            .create_by_group_name("Anna", "89991234567", "family")
            .unwrap();
        assert_eq!(contact.group_id.as_deref(), Some(family.id.as_str()));

        assert!(contacts
            .create_by_group_name("Maria", "89161112233", "Work")
            .is_none());
        assert!(matches!(
            contacts
                .try_create_by_group_name("Maria", "89161112233", "Work")
                .unwrap_err(),
            RegistryError::NotFound {
                entity: Entity::Group,
                ..
            }
        ));
    });
}

#[test]
fn update_applies_partial_changes() {
    with_registries(|groups, contacts| {
        let family = groups.create("Family").unwrap();
        let work = groups.create("Work").unwrap();
        let anna = contacts
            .create("Anna", "89991234567", Some(&family.id))
            .unwrap();

        let updated = contacts
            .update(
                &anna.id,
                &ContactPatch {
                    name: Some("Anna Maria".to_string()),
                    group_id: Some(Some(work.id.clone())),
                    ..ContactPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Anna Maria");
        assert_eq!(updated.phone, anna.phone);
        assert_eq!(updated.group_id.as_deref(), Some(work.id.as_str()));
        assert!(updated.updated_at > anna.updated_at);
        assert_eq!(contacts.find_by_id(&anna.id).unwrap(), updated);
    });
}

#[test]
fn update_to_other_contacts_phone_is_rejected() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();
        let maria = contacts.create("Maria", "89161112233", None).unwrap();

        let patch = ContactPatch {
            phone: Some(anna.phone.clone()),
            ..ContactPatch::default()
        };
        assert!(contacts.update(&maria.id, &patch).is_none());
        assert_eq!(contacts.find_by_id(&maria.id).unwrap().phone, maria.phone);

        let respelled = ContactPatch {
            phone: Some("8 (999) 123-45-67".to_string()),
            ..ContactPatch::default()
        };
        assert!(matches!(
            contacts.try_update(&maria.id, &respelled).unwrap_err(),
            RegistryError::Conflict { .. }
        ));
    });
}

#[test]
fn update_to_own_phone_is_allowed() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();
        let patch = ContactPatch {
            phone: Some("79991234567".to_string()),
            ..ContactPatch::default()
        };
        let updated = contacts.update(&anna.id, &patch).unwrap();
        assert_eq!(updated.phone, anna.phone);
    });
}

#[test]
fn update_rejects_unknown_contact_or_group() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();

        assert!(contacts.update("nope", &ContactPatch::default()).is_none());
        let patch = ContactPatch {
            group_id: Some(Some("ghost".to_string())),
            ..ContactPatch::default()
        };
        assert!(contacts.update(&anna.id, &patch).is_none());
        assert_eq!(contacts.find_by_id(&anna.id).unwrap().group_id, None);
    });
}

#[test]
fn delete_removes_only_target() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();
        let maria = contacts.create("Maria", "89161112233", None).unwrap();

        assert!(contacts.delete(&anna.id));
        assert!(!contacts.delete(&anna.id));
        assert!(contacts.find_by_id(&anna.id).is_none());
        assert!(contacts.find_by_id(&maria.id).is_some());
    });
}

#[test]
fn find_by_phone_accepts_any_valid_spelling() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();

        for phone in ["+7 (999) 123-45-67", "89991234567", "9991234567"] {
            assert_eq!(contacts.find_by_phone(phone).unwrap().id, anna.id);
        }
        assert!(contacts.find_by_phone("89160000000").is_none());
        assert!(contacts.find_by_phone("garbage").is_none());
    });
}

#[test]
fn search_by_name_is_case_insensitive_substring() {
    with_registries(|_, contacts| {
        contacts.create("Anna Maria", "89991234567", None).unwrap();
        contacts.create("Marianna", "89161112233", None).unwrap();
        contacts.create("Пётр", "89031234567", None).unwrap();

        assert_eq!(contacts.search_by_name("ANNA").len(), 2);
        assert_eq!(contacts.search_by_name("maria").len(), 2);
        assert_eq!(contacts.search_by_name("пЁт").len(), 1);
        assert!(contacts.search_by_name("zzz").is_empty());
        assert_eq!(contacts.search_by_name("").len(), 3);
    });
}

#[test]
fn counts_and_group_listings() {
    with_registries(|groups, contacts| {
        let family = groups.create("Family").unwrap();
        let work = groups.create("Work").unwrap();
        contacts.create("Anna", "89991234567", Some(&family.id)).unwrap();
        contacts.create("Maria", "89161112233", Some(&family.id)).unwrap();
        contacts.create("Ivan", "89031234567", Some(&work.id)).unwrap();
        contacts.create("Oleg", "89261234567", None).unwrap();

        assert_eq!(contacts.count(), 4);
        assert_eq!(contacts.count_by_group(&family.id), 2);
        assert_eq!(contacts.count_by_group(&work.id), 1);
        assert_eq!(contacts.count_by_group("ghost"), 0);
        assert_eq!(contacts.get_by_group_name("FAMILY").len(), 2);
        assert!(contacts.get_by_group_name("Nobody").is_empty());
        assert_eq!(contacts.get_ungrouped().len(), 1);
    });
}

#[test]
fn export_then_import_restores_contacts() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();
        let maria = contacts.create("Maria", "89161112233", None).unwrap();

        let export = contacts.export_data();
        assert_eq!(export.version, contactbook_core::core_version());
        let payload = serde_json::to_value(&export).unwrap();
        assert!(payload["exportDate"].is_string());

        assert!(contacts.clear_all());
        assert_eq!(contacts.count(), 0);

        assert!(contacts.import_data(&payload));
        assert_eq!(contacts.get_all(), vec![anna, maria]);
    });
}

#[test]
fn import_rejects_invalid_payload_without_writing() {
    with_registries(|_, contacts| {
        let anna = contacts.create("Anna", "89991234567", None).unwrap();

        assert!(!contacts.import_data(&json!({ "contacts": "nope" })));
        assert!(!contacts.import_data(&json!({
            "contacts": [
                { "id": "c1", "name": "Maria", "phone": "89161112233" },
                { "id": "c2", "name": "Ivan", "phone": "123" }
            ]
        })));
        assert!(matches!(
            contacts
                .try_import_data(&json!({
                    "contacts": [
                        { "id": "c1", "name": "Maria", "phone": "89161112233" },
                        { "id": "c2", "name": "Ivan", "phone": "+7 (916) 111-22-33" }
                    ]
                }))
                .unwrap_err(),
            RegistryError::Conflict { .. }
        ));

        assert_eq!(contacts.get_all(), vec![anna]);
    });
}

#[test]
fn persisted_layout_uses_camel_case_records() {
    let store = MemoryStore::new();
    let storage = StorageAdapter::new(&store);
    let groups = GroupRegistry::new(&storage);
    let contacts = ContactRegistry::new(&storage);

    let family = groups.create("Family").unwrap();
    contacts.create("Anna", "89991234567", Some(&family.id)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&store.get(keys::CONTACTS).unwrap().unwrap()).unwrap();
    let record = &raw[0];
    assert_eq!(record["groupId"], family.id.as_str());
    assert_eq!(record["phone"], "+7 (999) 123-45-67");
    for field in ["id", "name", "createdAt", "updatedAt"] {
        assert!(record.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn unavailable_store_never_panics() {
    let storage = StorageAdapter::new(UnavailableStore);
    let contacts = ContactRegistry::new(&storage);

    assert!(contacts.get_all().is_empty());
    assert_eq!(contacts.count(), 0);
    assert!(contacts.create("Anna", "89991234567", None).is_none());
    assert!(!contacts.delete("c1"));
    assert!(contacts.find_by_phone("89991234567").is_none());
}

#[test]
fn unreadable_records_survive_unrelated_writes() {
    let store = MemoryStore::new();
    store
        .set(
            keys::CONTACTS,
            &json!([{
                "id": "old1",
                "name": "Office",
                "phone": "+7 (495) 123-45-67"
            }])
            .to_string(),
        )
        .unwrap();
    let storage = StorageAdapter::new(&store);
    let contacts = ContactRegistry::new(&storage);

    let anna = contacts.create("Anna", "89991234567", None).unwrap();
    let maria = contacts.create("Maria", "89161112233", None).unwrap();
    assert!(contacts.delete(&maria.id));
    assert_eq!(contacts.get_all(), vec![anna.clone()]);

    let raw: Vec<serde_json::Value> = storage.load(keys::CONTACTS, Vec::new());
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0]["id"], anna.id.as_str());
    assert_eq!(raw[1]["id"], "old1");
    assert_eq!(raw[1]["phone"], "+7 (495) 123-45-67");
}

#[test]
fn import_replaces_unreadable_leftovers() {
    let store = MemoryStore::new();
    store
        .set(keys::CONTACTS, &json!([{ "id": "old1", "name": "X" }]).to_string())
        .unwrap();
    let storage = StorageAdapter::new(&store);
    let contacts = ContactRegistry::new(&storage);

    let count = contacts
        .try_import_data(&json!({
            "contacts": [{ "id": "c1", "name": "Maria", "phone": "89161112233" }]
        }))
        .unwrap();
    assert_eq!(count, 1);

    let raw: Vec<serde_json::Value> = storage.load(keys::CONTACTS, Vec::new());
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["id"], "c1");
}

#[test]
fn record_without_id_gets_one_stable_id() {
    let store = MemoryStore::new();
    store
        .set(
            keys::CONTACTS,
            &json!([{ "name": "Anna", "phone": "+7 (999) 123-45-67" }]).to_string(),
        )
        .unwrap();
    let storage = StorageAdapter::new(&store);
    let contacts = ContactRegistry::new(&storage);

    let first = contacts.get_all();
    let second = contacts.get_all();
    assert_eq!(first, second);

    let id = first[0].id.clone();
    assert_eq!(contacts.find_by_id(&id).unwrap().name, "Anna");
    assert!(contacts.delete(&id));
    assert_eq!(contacts.count(), 0);
}

#[test]
fn orphaned_contact_stays_editable() {
    with_registries(|groups, contacts| {
        let family = groups.create("Family").unwrap();
        let anna = contacts
            .create("Anna", "89991234567", Some(&family.id))
            .unwrap();
        assert!(groups.delete(&family.id));

        let keep_group = ContactPatch {
            name: Some("Anna Maria".to_string()),
            group_id: Some(Some(family.id.clone())),
            ..ContactPatch::default()
        };
        let updated = contacts.try_update(&anna.id, &keep_group).unwrap();
        assert_eq!(updated.name, "Anna Maria");
        assert_eq!(updated.group_id.as_deref(), Some(family.id.as_str()));
        assert_eq!(contacts.get_ungrouped().len(), 1);

        let other_ghost = ContactPatch {
            group_id: Some(Some("ghost".to_string())),
            ..ContactPatch::default()
        };
        assert!(matches!(
            contacts.try_update(&anna.id, &other_ghost).unwrap_err(),
            RegistryError::NotFound {
                entity: Entity::Group,
                ..
            }
        ));
    });
}
