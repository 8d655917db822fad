//! Search filtering for contact lists.
//!
//! Matching is plain case-insensitive substring containment. There is no
//! tokenizing and no fuzzy matching.

use tracing::trace;

use crate::contact::Contact;

/// Options controlling which fields a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match the query against the email address as well as the name.
    pub match_email: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { match_email: true }
    }
}

/// Reduce a contact list to the contacts matching `query`.
///
/// An empty query returns the full list unchanged. Any other query,
/// whitespace included, is matched as given. Input order is preserved.
#[must_use]
pub fn filter(contacts: &[Contact], query: &str, options: SearchOptions) -> Vec<Contact> {
    if query.is_empty() {
        return contacts.to_vec();
    }
    let needle = query.to_lowercase();

    let matches: Vec<Contact> = contacts
        .iter()
        .filter(|c| matches(c, &needle, options))
        .cloned()
        .collect();

    trace!(
        "query '{}' matched {} of {} contacts",
        needle,
        matches.len(),
        contacts.len()
    );
    matches
}

/// Check a single contact against an already-lowercased needle.
fn matches(contact: &Contact, needle: &str, options: SearchOptions) -> bool {
    if contact.name.to_lowercase().contains(needle) {
        return true;
    }
    options.match_email
        && contact
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(needle))
}
