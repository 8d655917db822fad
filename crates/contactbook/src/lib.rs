//! `contactbook` - A contact list with search, alphabetical sections and
//! snapshot persistence.
//!
//! The [`ContactStore`] owns the contacts and persists a full snapshot to a
//! [`BlobStore`] after every change. [`filter`] and [`group`] turn the list
//! into what a list screen shows.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod filter;
pub mod group;
pub mod links;
pub mod logging;
pub mod storage;
pub mod store;

pub use config::Config;
pub use contact::{Contact, ContactDraft, ContactId};
pub use error::{Error, Result};
pub use filter::{filter, SearchOptions};
pub use group::{group, Section};
pub use links::ContactLink;
pub use logging::init_logging;
pub use storage::{BlobStore, MemoryBlobStore, SqliteBlobStore, StorageStats};
pub use store::{ContactStore, Directory, StoreOptions};
