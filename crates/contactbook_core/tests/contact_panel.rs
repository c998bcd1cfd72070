use contactbook_core::{
    ContactForm, ContactPanel, ContactRegistry, GroupRegistry, MemoryStore, PanelError,
    PanelState, RegistryError, StorageAdapter,
};

#[test]
fn submit_requires_open_panel() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let contacts = ContactRegistry::new(&storage);
    let mut panel = ContactPanel::new();

    let err = panel
        .submit(&contacts, ContactForm::new("Anna", "89991234567", None))
        .unwrap_err();
    assert_eq!(err, PanelError::NotOpen);
    assert_eq!(contacts.count(), 0);
}

#[test]
fn new_contact_flow_closes_on_success() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let groups = GroupRegistry::new(&storage);
    let contacts = ContactRegistry::new(&storage);
    let family = groups.create("Family").unwrap();
    let mut panel = ContactPanel::new();

    panel.open_new().unwrap();
    assert_eq!(panel.state(), &PanelState::Open { editing: None });

    let contact = panel
        .submit(
            &contacts,
            ContactForm::new("Anna", "89991234567", Some(family.id.clone())),
        )
        .unwrap();
    assert_eq!(panel.state(), &PanelState::Closed);
    assert_eq!(contacts.find_by_id(&contact.id).unwrap(), contact);
}

#[test]
fn rejected_submit_keeps_panel_open() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let contacts = ContactRegistry::new(&storage);
    let mut panel = ContactPanel::new();
    panel.open_new().unwrap();

    let err = panel
        .submit(&contacts, ContactForm::new("A", "89991234567", None))
        .unwrap_err();
    assert!(matches!(err, PanelError::Rejected(RegistryError::Validation(_))));
    assert_eq!(panel.state(), &PanelState::Open { editing: None });

    panel
        .submit(&contacts, ContactForm::new("Anna", "89991234567", None))
        .unwrap();
    assert!(!panel.is_open());
}

#[test]
fn edit_flow_prefills_form_and_updates_contact() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let contacts = ContactRegistry::new(&storage);
    let anna = contacts.create("Anna", "89991234567", None).unwrap();
    let mut panel = ContactPanel::new();

    let mut form = panel.open_edit(&contacts, &anna.id).unwrap();
    assert_eq!(
        panel.state(),
        &PanelState::Open {
            editing: Some(anna.id.clone())
        }
    );
    assert_eq!(form.phone, anna.phone);

    form.name = "Anna Maria".to_string();
    let updated = panel.submit(&contacts, form).unwrap();
    assert_eq!(updated.id, anna.id);
    assert_eq!(updated.name, "Anna Maria");
    assert_eq!(contacts.count(), 1);
    assert_eq!(panel.state(), &PanelState::Closed);
}

#[test]
fn open_edit_of_missing_contact_stays_closed() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let contacts = ContactRegistry::new(&storage);
    let mut panel = ContactPanel::new();

    let err = panel.open_edit(&contacts, "ghost").unwrap_err();
    assert_eq!(err, PanelError::ContactNotFound("ghost".to_string()));
    assert_eq!(panel.state(), &PanelState::Closed);
}

#[test]
fn opening_twice_is_rejected_and_close_is_idempotent() {
    let mut panel = ContactPanel::new();
    panel.open_new().unwrap();
    assert_eq!(panel.open_new().unwrap_err(), PanelError::AlreadyOpen);

    panel.close();
    panel.close();
    assert_eq!(panel.state(), &PanelState::Closed);
    panel.open_new().unwrap();
}

#[test]
fn contact_of_deleted_group_can_be_edited() {
    let storage = StorageAdapter::new(MemoryStore::new());
    let groups = GroupRegistry::new(&storage);
    let contacts = ContactRegistry::new(&storage);
    let family = groups.create("Family").unwrap();
    let anna = contacts
        .create("Anna", "89991234567", Some(&family.id))
        .unwrap();
    assert!(groups.delete(&family.id));
    let mut panel = ContactPanel::new();

    let mut form = panel.open_edit(&contacts, &anna.id).unwrap();
    form.name = "Anna Maria".to_string();
    let updated = panel.submit(&contacts, form).unwrap();

    assert_eq!(updated.name, "Anna Maria");
    assert_eq!(updated.group_id, anna.group_id);
    assert_eq!(panel.state(), &PanelState::Closed);
}
