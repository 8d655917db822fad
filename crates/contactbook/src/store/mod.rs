//! The contact store.
//!
//! [`ContactStore`] owns the contact collection and is the only thing that
//! mutates it. Every successful mutation queues exactly one full snapshot
//! for the background [`SnapshotWriter`]; the in-memory list is updated
//! immediately and never rolled back if the write later fails.

mod defaults;
mod writer;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::contact::{Contact, ContactDraft, ContactId};
use crate::error::{Error, Result};
use crate::filter::{filter, SearchOptions};
use crate::group::{group, Section};
use crate::storage::BlobStore;

pub use defaults::default_contacts;
pub use writer::SnapshotWriter;

/// Default blob store key for the contact snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "contacts";

/// Default base URL for derived avatars.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150?u=";

/// Settings the store needs at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Blob store key the snapshot lives under.
    pub storage_key: String,
    /// Whether drafts must carry an email address.
    pub require_email: bool,
    /// Id of the "my profile" contact, if one is distinguished.
    pub profile_id: Option<ContactId>,
    /// Prefix for derived avatar URIs.
    pub avatar_base_url: String,
    /// Search behavior for [`ContactStore::sections`].
    pub search: SearchOptions,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            require_email: true,
            profile_id: None,
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
            search: SearchOptions::default(),
        }
    }
}

/// What a list screen renders: the pinned profile and the sections below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// The pinned profile contact, if present.
    pub profile: Option<Contact>,
    /// Alphabetical sections of every other matching contact.
    pub sections: Vec<Section>,
}

impl Directory {
    /// Total number of contacts across all sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.members.len()).sum()
    }

    /// Check if no section has any contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single source of truth for the contact collection.
#[derive(Debug)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    options: StoreOptions,
    writer: SnapshotWriter,
}

impl ContactStore {
    /// Hydrate a store from the blob store and start its snapshot writer.
    ///
    /// # Errors
    ///
    /// Returns an error only if the writer thread cannot be started; a
    /// missing or unreadable snapshot falls back to the default dataset.
    pub fn open(blob: Arc<dyn BlobStore>, options: StoreOptions) -> Result<Self> {
        let contacts = Self::load(&*blob, &options);
        let writer = SnapshotWriter::spawn(blob, options.storage_key.clone())?;
        info!("Contact store ready with {} contacts", contacts.len());
        Ok(Self {
            contacts,
            options,
            writer,
        })
    }

    /// Read the persisted snapshot, falling back to the bundled defaults.
    ///
    /// Never fails: a missing key, a read error, or an unparsable value all
    /// yield the default dataset.
    #[must_use]
    pub fn load(blob: &dyn BlobStore, options: &StoreOptions) -> Vec<Contact> {
        let key = options.storage_key.as_str();
        let raw = match blob.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No snapshot under '{}', using default contacts", key);
                return default_contacts(&options.avatar_base_url);
            }
            Err(e) => {
                warn!("Could not read snapshot under '{}': {}; using default contacts", key, e);
                return default_contacts(&options.avatar_base_url);
            }
        };

        match serde_json::from_str::<Vec<Contact>>(&raw) {
            Ok(contacts) => {
                debug!("Loaded {} contacts from '{}'", contacts.len(), key);
                normalize(contacts, &options.avatar_base_url)
            }
            Err(e) => {
                warn!("Snapshot under '{}' is unparsable: {}; using default contacts", key, e);
                default_contacts(&options.avatar_base_url)
            }
        }
    }

    /// Get the options this store was opened with.
    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Every contact, in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Contact] {
        &self.contacts
    }

    /// Number of contacts, including the profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Check if the store holds no contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Look up a contact by id.
    #[must_use]
    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    /// Check if `id` is the distinguished profile contact.
    #[must_use]
    pub fn is_profile(&self, id: &ContactId) -> bool {
        self.options.profile_id.as_ref() == Some(id)
    }

    /// The profile contact, if configured and present.
    #[must_use]
    pub fn profile(&self) -> Option<&Contact> {
        self.options.profile_id.as_ref().and_then(|id| self.get(id))
    }

    /// Every contact except the profile, in insertion order.
    #[must_use]
    pub fn general(&self) -> Vec<Contact> {
        self.contacts
            .iter()
            .filter(|c| !self.is_profile(&c.id))
            .cloned()
            .collect()
    }

    /// Filter the general contacts by `query` and group the result.
    #[must_use]
    pub fn sections(&self, query: &str) -> Directory {
        let matches = filter(&self.general(), query, self.options.search);
        Directory {
            profile: self.profile().cloned(),
            sections: group(&matches),
        }
    }

    /// Add a new contact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is missing; the
    /// store is left unchanged.
    pub fn create(&mut self, draft: ContactDraft) -> Result<Contact> {
        draft.validate(self.options.require_email)?;

        let id = loop {
            let candidate = ContactId::generate();
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };

        let contact = Contact::from_draft(id, draft, &self.options.avatar_base_url);
        self.contacts.push(contact.clone());
        info!("Created contact {} ({})", contact.id, contact.name);
        self.persist();
        Ok(contact)
    }

    /// Replace an existing contact's fields.
    ///
    /// The id is preserved, and so is the avatar unless the draft supplies one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id and [`Error::Validation`]
    /// if a required field is missing; the store is left unchanged.
    pub fn update(&mut self, id: &ContactId, draft: ContactDraft) -> Result<Contact> {
        let index = self.position(id)?;
        draft.validate(self.options.require_email)?;

        let contact = &mut self.contacts[index];
        contact.apply(draft);
        let updated = contact.clone();
        info!("Updated contact {}", updated.id);
        self.persist();
        Ok(updated)
    }

    /// Remove a contact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id and [`Error::Forbidden`]
    /// for the profile contact; the store is left unchanged.
    pub fn delete(&mut self, id: &ContactId) -> Result<()> {
        let index = self.position(id)?;
        if self.is_profile(id) {
            return Err(Error::Forbidden {
                id: id.to_string(),
                reason: "the profile contact cannot be deleted",
            });
        }

        let removed = self.contacts.remove(index);
        info!("Deleted contact {} ({})", removed.id, removed.name);
        self.persist();
        Ok(())
    }

    /// Replace every contact with the bundled default dataset.
    pub fn reset(&mut self) {
        self.contacts = default_contacts(&self.options.avatar_base_url);
        info!("Reset to {} default contacts", self.contacts.len());
        self.persist();
    }

    /// Block until every queued snapshot has been attempted.
    pub fn flush(&self) {
        self.writer.flush();
    }

    /// Number of snapshots that failed to persist since the store opened.
    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.writer.failed()
    }

    fn position(&self, id: &ContactId) -> Result<usize> {
        self.contacts
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| Error::not_found(id.as_str()))
    }

    /// Queue the full current list for writing.
    fn persist(&self) {
        match serde_json::to_string(&self.contacts) {
            Ok(snapshot) => self.writer.submit(snapshot),
            Err(e) => error!("Failed to serialize contact snapshot: {}", e),
        }
    }
}

/// Drop records with duplicate ids and fill in missing avatars.
fn normalize(contacts: Vec<Contact>, avatar_base_url: &str) -> Vec<Contact> {
    let mut seen = HashSet::new();
    contacts
        .into_iter()
        .filter_map(|mut contact| {
            if !seen.insert(contact.id.clone()) {
                warn!("Dropping duplicate contact id {} from snapshot", contact.id);
                return None;
            }
            contact.ensure_avatar(avatar_base_url);
            Some(contact)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBlobStore, SqliteBlobStore};

    fn options() -> StoreOptions {
        StoreOptions {
            profile_id: Some(ContactId::from("me")),
            ..StoreOptions::default()
        }
    }

    fn ann_snapshot() -> String {
        r#"[{"id":"1","name":"Ann","phone":"111","email":"ann@x.com","avatar":"ann.png"}]"#
            .to_string()
    }

    fn open_with(blob: &Arc<MemoryBlobStore>) -> ContactStore {
        ContactStore::open(blob.clone(), options()).unwrap()
    }

    fn bo() -> ContactDraft {
        ContactDraft::new("Bo", "123").with_email("b@x.com")
    }

    #[test]
    fn test_load_missing_key_uses_defaults() {
        let blob = MemoryBlobStore::new();
        let contacts = ContactStore::load(&blob, &options());
        assert_eq!(contacts, default_contacts(DEFAULT_AVATAR_BASE_URL));
    }

    #[derive(Debug)]
    struct UnreadableBlobStore;

    impl BlobStore for UnreadableBlobStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Err(Error::persistence(key, "disk unreadable"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_read_error_uses_defaults() {
        let contacts = ContactStore::load(&UnreadableBlobStore, &options());
        assert_eq!(contacts, default_contacts(DEFAULT_AVATAR_BASE_URL));
    }

    #[test]
    fn test_open_survives_read_error() {
        let store = ContactStore::open(Arc::new(UnreadableBlobStore), options()).unwrap();
        assert_eq!(store.list(), default_contacts(DEFAULT_AVATAR_BASE_URL).as_slice());
    }

    #[test]
    fn test_load_unparsable_uses_defaults() {
        let blob = MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, "{not json");
        let contacts = ContactStore::load(&blob, &options());
        assert_eq!(contacts, default_contacts(DEFAULT_AVATAR_BASE_URL));
    }

    #[test]
    fn test_load_persisted_snapshot() {
        let blob = MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot());
        let contacts = ContactStore::load(&blob, &options());

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Ann");
        assert_eq!(contacts[0].avatar, "ann.png");
    }

    #[test]
    fn test_load_empty_list_is_respected() {
        let blob = MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, "[]");
        assert!(ContactStore::load(&blob, &options()).is_empty());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let blob = MemoryBlobStore::with_entry(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"1","name":"Ann"},{"id":"1","name":"Impostor"}]"#,
        );
        let contacts = ContactStore::load(&blob, &options());

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Ann");
        assert!(!contacts[0].avatar.is_empty());
    }

    #[test]
    fn test_create_appends_and_persists() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        let created = store.create(bo()).unwrap();
        store.flush();

        assert_eq!(store.len(), 2);
        assert_ne!(created.id.as_str(), "1");
        assert!(!created.avatar.is_empty());
        assert_eq!(blob.write_count(), 1);
    }

    #[test]
    fn test_create_then_reload_keeps_all_fields() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let created = {
            let mut store = open_with(&blob);
            let created = store
                .create(bo().with_title("Drummer"))
                .unwrap();
            store.flush();
            created
        };

        let reloaded = ContactStore::load(&*blob, &options());
        let found = reloaded.iter().find(|c| c.id == created.id).unwrap();
        assert_eq!(found, &created);
    }

    #[test]
    fn test_create_validation_blocks_mutation() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        let err = store.create(ContactDraft::new("", "")).unwrap_err();
        store.flush();

        match err {
            Error::Validation { fields } => assert_eq!(fields, vec!["name", "phone", "email"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(blob.write_count(), 0);
    }

    #[test]
    fn test_create_without_email_when_not_required() {
        let blob: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let mut store = ContactStore::open(
            blob,
            StoreOptions {
                require_email: false,
                ..options()
            },
        )
        .unwrap();

        assert!(store.create(ContactDraft::new("Bo", "123")).is_ok());
    }

    #[test]
    fn test_update_preserves_id_and_avatar() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);
        let id = ContactId::from("1");

        let updated = store
            .update(&id, ContactDraft::new("Annie", "222").with_email("annie@x.com"))
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.avatar, "ann.png");
        assert_eq!(updated.name, "Annie");
        assert_eq!(store.get(&id).unwrap(), &updated);
    }

    #[test]
    fn test_update_can_override_avatar() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        let updated = store
            .update(&ContactId::from("1"), bo().with_avatar("bo.png"))
            .unwrap();
        assert_eq!(updated.avatar, "bo.png");
    }

    #[test]
    fn test_update_unknown_id() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        let err = store.update(&ContactId::from("nope"), bo()).unwrap_err();
        store.flush();

        assert!(err.is_not_found());
        assert_eq!(blob.write_count(), 0);
    }

    #[test]
    fn test_update_validation_leaves_record_unchanged() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);
        let id = ContactId::from("1");
        let before = store.get(&id).unwrap().clone();

        let err = store.update(&id, ContactDraft::new("Ann", "")).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.get(&id).unwrap(), &before);
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        store.delete(&ContactId::from("1")).unwrap();
        store.flush();

        assert!(store.is_empty());
        assert_eq!(blob.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_delete_unknown_id_leaves_list_unchanged() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);
        let before = store.list().to_vec();

        let err = store.delete(&ContactId::from("nope")).unwrap_err();
        store.flush();

        assert!(err.is_not_found());
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(blob.write_count(), 0);
    }

    #[test]
    fn test_delete_profile_is_forbidden() {
        let blob = Arc::new(MemoryBlobStore::new());
        let mut store = open_with(&blob);
        let me = ContactId::from("me");
        assert!(store.get(&me).is_some());

        let err = store.delete(&me).unwrap_err();

        assert!(err.is_forbidden());
        assert!(store.get(&me).is_some());
    }

    #[test]
    fn test_profile_excluded_from_sections() {
        let blob = Arc::new(MemoryBlobStore::new());
        let store = open_with(&blob);

        let directory = store.sections("");
        assert_eq!(directory.profile.as_ref().unwrap().id.as_str(), "me");
        assert_eq!(directory.len(), store.len() - 1);
        assert!(directory
            .sections
            .iter()
            .flat_map(|s| &s.members)
            .all(|c| c.id.as_str() != "me"));
    }

    #[test]
    fn test_sections_filters_by_query() {
        let blob = Arc::new(MemoryBlobStore::new());
        let store = open_with(&blob);

        let directory = store.sections("turing");
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.sections[0].title, "A");
        assert!(store.sections("no such person").is_empty());
    }

    #[test]
    fn test_persistence_failure_keeps_in_memory_change() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        blob.set_fail_writes(true);
        let mut store = open_with(&blob);

        let created = store.create(bo()).unwrap();
        store.flush();

        assert!(store.get(&created.id).is_some());
        assert_eq!(store.failed_writes(), 1);
        assert_eq!(
            blob.get(DEFAULT_STORAGE_KEY).unwrap(),
            Some(ann_snapshot())
        );
    }

    #[test]
    fn test_every_mutation_writes_once() {
        let blob = Arc::new(MemoryBlobStore::new());
        let mut store = open_with(&blob);

        let created = store.create(bo()).unwrap();
        store.update(&created.id, bo().with_title("Lead")).unwrap();
        store.delete(&created.id).unwrap();
        store.flush();

        assert_eq!(blob.write_count(), 3);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let blob = Arc::new(MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, &ann_snapshot()));
        let mut store = open_with(&blob);

        store.reset();
        store.flush();

        assert_eq!(store.list(), default_contacts(DEFAULT_AVATAR_BASE_URL).as_slice());
        assert_eq!(blob.write_count(), 1);
    }

    #[test]
    fn test_sqlite_round_trip_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contacts.db");

        let created = {
            let blob: Arc<dyn BlobStore> = Arc::new(SqliteBlobStore::open(&path).unwrap());
            let mut store = ContactStore::open(blob, options()).unwrap();
            store.create(bo()).unwrap()
        };

        let blob: Arc<dyn BlobStore> = Arc::new(SqliteBlobStore::open(&path).unwrap());
        let store = ContactStore::open(blob, options()).unwrap();
        assert_eq!(store.get(&created.id), Some(&created));
    }
}
