//! Contact data structure
//!
//! A contact is one addressable party: a person, a shore station or a
//! vessel. Name and phone are required; everything else is optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecordError;
use crate::Result;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier, never changes once assigned
    #[serde(default = "new_id")]
    pub id: String,
    /// Display name
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Secondary channel identifier (e.g. a VHF working channel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Secondary call-sign identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-form location tag (marina, harbor, anchorage)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Last time the contact was called or messaged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorite: bool,
}

/// Everything about a contact except its identity.
///
/// Editors and importers build drafts; the directory turns them into
/// contacts, assigning the id and validating the required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub call_sign: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub favorite: bool,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_call_sign(mut self, call_sign: impl Into<String>) -> Self {
        self.call_sign = Some(call_sign.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Check the required fields without consuming the draft
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if self.phone.trim().is_empty() {
            return Err(RecordError::EmptyPhone);
        }
        Ok(())
    }
}

/// Blank optional text is stored as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Contact {
    /// Create a contact from a draft: new id, last used now.
    pub fn from_draft(draft: ContactDraft) -> Result<Self> {
        draft.validate()?;

        Ok(Self {
            id: new_id(),
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            role: non_blank(draft.role),
            organization: non_blank(draft.organization),
            channel: non_blank(draft.channel),
            call_sign: non_blank(draft.call_sign),
            notes: non_blank(draft.notes),
            location: non_blank(draft.location),
            last_used: Some(Utc::now()),
            favorite: draft.favorite,
        })
    }

    /// Replace the editable fields, keeping identity and last-used time
    pub fn apply(&mut self, draft: ContactDraft) -> Result<()> {
        draft.validate()?;

        self.name = draft.name.trim().to_string();
        self.phone = draft.phone.trim().to_string();
        self.role = non_blank(draft.role);
        self.organization = non_blank(draft.organization);
        self.channel = non_blank(draft.channel);
        self.call_sign = non_blank(draft.call_sign);
        self.notes = non_blank(draft.notes);
        self.location = non_blank(draft.location);
        self.favorite = draft.favorite;

        Ok(())
    }

    /// Stamp the current time as last used
    pub fn touch(&mut self) {
        self.last_used = Some(Utc::now());
    }

    /// The editable part of this contact, for pre-filling an editor
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
            organization: self.organization.clone(),
            channel: self.channel.clone(),
            call_sign: self.call_sign.clone(),
            notes: self.notes.clone(),
            location: self.location.clone(),
            favorite: self.favorite,
        }
    }
}
