//! Configuration management for contactbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::contact::ContactId;
use crate::error::{Error, Result};
use crate::filter::SearchOptions;
use crate::store::{StoreOptions, DEFAULT_AVATAR_BASE_URL, DEFAULT_STORAGE_KEY};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "contactbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "contacts.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CONTACTBOOK_`, nested with `__`)
/// 2. TOML config file at `~/.config/contactbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Contact record configuration.
    pub contacts: ContactsConfig,
    /// Search configuration.
    pub search: SearchConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/contactbook/contacts.db`
    pub database_path: Option<PathBuf>,
    /// Key the contact snapshot is stored under.
    pub storage_key: String,
}

/// Contact record configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Require an email address on create and update.
    pub require_email: bool,
    /// Id of the pinned "my profile" contact.
    pub profile_id: Option<String>,
    /// Label shown for contacts without a title.
    pub default_title: String,
    /// Prefix for avatar URIs derived from contact ids.
    pub avatar_base_url: String,
}

/// Search-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Match search queries against email addresses too.
    pub match_email: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            require_email: true,
            profile_id: Some("me".to_string()),
            default_title: "Contact".to_string(),
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { match_email: true }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CONTACTBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage_key must not be empty".to_string(),
            });
        }

        if self.contacts.avatar_base_url.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "avatar_base_url must not be empty".to_string(),
            });
        }

        if let Some(profile_id) = &self.contacts.profile_id {
            if profile_id.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "profile_id must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the search options.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            match_email: self.search.match_email,
        }
    }

    /// Build the runtime options for a contact store.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            storage_key: self.storage.storage_key.clone(),
            require_email: self.contacts.require_email,
            profile_id: self.contacts.profile_id.as_deref().map(ContactId::from),
            avatar_base_url: self.contacts.avatar_base_url.clone(),
            search: self.search_options(),
        }
    }
}
