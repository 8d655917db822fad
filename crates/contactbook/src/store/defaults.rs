//! Bundled default dataset.

use tracing::error;

use crate::contact::Contact;

const DEFAULT_CONTACTS: &str = include_str!("../../data/default_contacts.json");

/// Parse the bundled default contacts, filling in derived avatars.
///
/// Returns an empty list (and logs) if the bundled data is malformed.
#[must_use]
pub fn default_contacts(avatar_base_url: &str) -> Vec<Contact> {
    match serde_json::from_str::<Vec<Contact>>(DEFAULT_CONTACTS) {
        Ok(mut contacts) => {
            for contact in &mut contacts {
                contact.ensure_avatar(avatar_base_url);
            }
            contacts
        }
        Err(e) => {
            error!("Bundled default contacts are malformed: {}", e);
            Vec::new()
        }
    }
}
