//! Core contact types for contactbook.
//!
//! This module defines the contact record, its identifier, and the draft
//! payload submitted by add and edit forms.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque unique identifier of a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person record.
///
/// Field names are part of the persisted snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier, assigned at creation and never changed.
    pub id: ContactId,

    /// Display name; the sort and group key.
    pub name: String,

    /// Free-form phone number.
    #[serde(default)]
    pub phone: String,

    /// Email address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar image URI.
    #[serde(default)]
    pub avatar: String,

    /// Role label, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Contact {
    /// Build a new contact from a draft with a freshly assigned id.
    ///
    /// The avatar is derived from the id unless the draft supplies one.
    #[must_use]
    pub fn from_draft(id: ContactId, draft: ContactDraft, avatar_base_url: &str) -> Self {
        let avatar = draft
            .avatar
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| default_avatar(&id, avatar_base_url));
        Self {
            id,
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            email: non_blank(draft.email),
            avatar,
            title: non_blank(draft.title),
        }
    }

    /// Replace this contact's fields with the draft's.
    ///
    /// The id never changes. The avatar is kept unless the draft supplies one.
    pub fn apply(&mut self, draft: ContactDraft) {
        self.name = draft.name.trim().to_string();
        self.phone = draft.phone.trim().to_string();
        self.email = non_blank(draft.email);
        self.title = non_blank(draft.title);
        if let Some(avatar) = draft.avatar.filter(|a| !a.trim().is_empty()) {
            self.avatar = avatar;
        }
    }

    /// Get the role label, or the given fallback when none is set.
    #[must_use]
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    /// Fill in an avatar for records persisted without one.
    pub(crate) fn ensure_avatar(&mut self, avatar_base_url: &str) {
        if self.avatar.trim().is_empty() {
            self.avatar = default_avatar(&self.id, avatar_base_url);
        }
    }
}

/// The fields submitted by an add or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: Option<String>,
    /// Explicit avatar URI; derived from the id when absent.
    pub avatar: Option<String>,
    /// Role label.
    pub title: Option<String>,
}

impl ContactDraft {
    /// Create a draft with a name and phone number.
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set an explicit avatar URI.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Set the role label.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming every missing field.
    pub fn validate(&self, require_email: bool) -> Result<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if require_email && self.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            missing.push("email");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields: missing })
        }
    }
}

impl From<&Contact> for ContactDraft {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            avatar: Some(contact.avatar.clone()),
            title: contact.title.clone(),
        }
    }
}

/// Derive the placeholder avatar URI for an id.
#[must_use]
pub fn default_avatar(id: &ContactId, avatar_base_url: &str) -> String {
    let digest = blake3::hash(id.as_str().as_bytes()).to_hex();
    format!("{avatar_base_url}{}", &digest[..16])
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
