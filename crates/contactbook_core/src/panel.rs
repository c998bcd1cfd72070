//! Contact panel state machine.
//!
//! # Responsibility
//! - Track whether the add/edit contact panel is closed, open for a new
//!   contact, or open for editing an existing one.
//! - Route form submission to `create` or `update` accordingly.
//!
//! # Invariants
//! - Registry writes are only reachable from an open panel.
//! - A successful submit closes the panel; a rejected one leaves it open
//!   with the same editing target.
//!
//! ```text
//! Closed --open_new--> Open(None) --submit ok--> Closed
//! Closed --open_edit--> Open(Some(id)) --submit ok--> Closed
//! Open(_) --close--> Closed
//! ```

use crate::model::contact::{Contact, ContactId, ContactPatch};
use crate::registry::contact_registry::ContactRegistry;
use crate::registry::RegistryError;
use crate::store::KeyValueStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open {
        /// `None` while adding a new contact.
        editing: Option<ContactId>,
    },
}

/// Raw field values collected by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub group_id: Option<String>,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, group_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            group_id,
        }
    }

    /// Prefills the form from a stored contact.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            group_id: contact.group_id.clone(),
        }
    }

    fn into_patch(self) -> ContactPatch {
        ContactPatch {
            name: Some(self.name),
            phone: Some(self.phone),
            group_id: Some(self.group_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    NotOpen,
    AlreadyOpen,
    ContactNotFound(ContactId),
    Rejected(RegistryError),
}

impl Display for PanelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "contact panel is not open"),
            Self::AlreadyOpen => write!(f, "contact panel is already open"),
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Rejected(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PanelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContactPanel {
    state: PanelState,
}

impl ContactPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open { .. })
    }

    /// Opens the panel for a new contact.
    pub fn open_new(&mut self) -> Result<(), PanelError> {
        if self.is_open() {
            return Err(PanelError::AlreadyOpen);
        }
        self.state = PanelState::Open { editing: None };
        Ok(())
    }

    /// Opens the panel on an existing contact and returns a prefilled form.
    pub fn open_edit<S: KeyValueStore>(
        &mut self,
        registry: &ContactRegistry<'_, S>,
        contact_id: &str,
    ) -> Result<ContactForm, PanelError> {
        if self.is_open() {
            return Err(PanelError::AlreadyOpen);
        }
        let contact = registry
            .find_by_id(contact_id)
            .ok_or_else(|| PanelError::ContactNotFound(contact_id.to_string()))?;
        self.state = PanelState::Open {
            editing: Some(contact.id.clone()),
        };
        Ok(ContactForm::from_contact(&contact))
    }

    /// Closes the panel, discarding any pending edit.
    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    /// Submits the form: create when adding, full update when editing.
    pub fn submit<S: KeyValueStore>(
        &mut self,
        registry: &ContactRegistry<'_, S>,
        form: ContactForm,
    ) -> Result<Contact, PanelError> {
        let result = match &self.state {
            PanelState::Closed => return Err(PanelError::NotOpen),
            PanelState::Open { editing: None } => {
                registry.try_create(&form.name, &form.phone, form.group_id.as_deref())
            }
            PanelState::Open {
                editing: Some(contact_id),
            } => registry.try_update(contact_id, &form.into_patch()),
        };

        let contact = result.map_err(PanelError::Rejected)?;
        self.state = PanelState::Closed;
        Ok(contact)
    }
}
