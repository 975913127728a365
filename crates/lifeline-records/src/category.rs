//! Category data structure

use serde::{Deserialize, Serialize};

use crate::contact::{new_id, Contact};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    /// Protected category: cannot be deleted, renamed or relocated
    #[serde(default)]
    pub system: bool,
    /// Ordered contacts; the order is what users see
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            system: false,
            contacts: Vec::new(),
        }
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self {
            system: true,
            ..Self::new(name)
        }
    }

    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
