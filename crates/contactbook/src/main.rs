//! `cbook` - CLI for contactbook
//!
//! This binary lists, searches and edits the contact book stored in the
//! local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use contactbook::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, EditCommand, LinkCommand, ListCommand,
    OutputFormat, ShowCommand,
};
use contactbook::{
    init_logging, BlobStore, Config, Contact, ContactDraft, ContactId, ContactLink, ContactStore,
    SqliteBlobStore,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => {
            let mut store = open_store(&config)?;
            let result = run(&config, &mut store, command);

            // Everything queued so far must reach the database before exit
            store.flush();
            if store.failed_writes() > 0 {
                warn!(
                    "{} snapshot write(s) failed; recent changes may not be saved",
                    store.failed_writes()
                );
            }
            result
        }
    }
}

fn open_store(config: &Config) -> Result<ContactStore> {
    let path = config.database_path();
    let blob = SqliteBlobStore::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    let blob: Arc<dyn BlobStore> = Arc::new(blob);
    ContactStore::open(blob, config.store_options()).context("failed to start contact store")
}

fn run(config: &Config, store: &mut ContactStore, command: Command) -> Result<()> {
    match command {
        Command::List(cmd) => handle_list(config, store, &cmd),
        Command::Show(cmd) => handle_show(config, store, &cmd),
        Command::Add(cmd) => {
            let contact = store.create(ContactDraft::from(cmd))?;
            println!("Added {} ({})", contact.name, contact.id);
            Ok(())
        }
        Command::Edit(cmd) => handle_edit(store, cmd),
        Command::Delete(cmd) => handle_delete(store, &cmd),
        Command::Link(cmd) => handle_link(store, &cmd),
        Command::Reset { yes } => {
            if yes {
                store.reset();
                println!("Restored {} default contacts.", store.len());
            } else {
                println!("This will replace every contact with the bundled defaults.");
                println!("Use --yes to confirm.");
            }
            Ok(())
        }
        Command::Status(_) | Command::Config(_) => Ok(()),
    }
}

fn handle_list(config: &Config, store: &ContactStore, cmd: &ListCommand) -> Result<()> {
    let directory = store.sections(cmd.query.as_deref().unwrap_or_default());

    if cmd.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
        return Ok(());
    }

    let fallback = config.contacts.default_title.as_str();
    if let Some(profile) = &directory.profile {
        println!("* {}  {}", profile.name, profile.title_or(fallback));
        println!();
    }
    if directory.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }
    for section in &directory.sections {
        println!("{}", section.title);
        for contact in &section.members {
            println!(
                "  {:<24} {:<16} {:<18} {}",
                contact.name,
                contact.title_or(fallback),
                contact.phone,
                contact.id
            );
        }
    }
    Ok(())
}

fn handle_show(config: &Config, store: &ContactStore, cmd: &ShowCommand) -> Result<()> {
    let contact = find(store, &cmd.id)?;

    if cmd.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(contact)?);
        return Ok(());
    }

    println!("{}", contact.name);
    println!("  Id:      {}", contact.id);
    println!("  Title:   {}", contact.title_or(&config.contacts.default_title));
    println!("  Phone:   {}", contact.phone);
    println!("  Email:   {}", contact.email.as_deref().unwrap_or("-"));
    println!("  Avatar:  {}", contact.avatar);
    if store.is_profile(&contact.id) {
        println!("  (my profile)");
    }
    Ok(())
}

fn handle_edit(store: &mut ContactStore, cmd: EditCommand) -> Result<()> {
    let id = ContactId::from(cmd.id.as_str());
    let current = ContactDraft::from(find(store, &cmd.id)?);
    let contact = store.update(&id, cmd.apply_to(current))?;
    println!("Updated {} ({})", contact.name, contact.id);
    Ok(())
}

fn handle_delete(store: &mut ContactStore, cmd: &DeleteCommand) -> Result<()> {
    let id = ContactId::from(cmd.id.as_str());
    if !cmd.yes {
        let name = find(store, &cmd.id)?.name.clone();
        println!("This will delete {name} ({id}).");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    store.delete(&id)?;
    println!("Deleted {id}.");
    Ok(())
}

fn handle_link(store: &ContactStore, cmd: &LinkCommand) -> Result<()> {
    let contact = find(store, &cmd.id)?;
    println!("{}", ContactLink::from(cmd.kind).uri(contact)?);
    Ok(())
}

fn find<'a>(store: &'a ContactStore, id: &str) -> Result<&'a Contact> {
    store
        .get(&ContactId::from(id))
        .ok_or_else(|| contactbook::Error::not_found(id).into())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let path = config.database_path();
    let blob = SqliteBlobStore::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    let stats = blob.stats()?;
    let contacts = ContactStore::load(&blob, &config.store_options()).len();
    let entries = blob
        .keys()?
        .into_iter()
        .map(|key| {
            let updated_at = blob.updated_at(&key)?;
            Ok((key, updated_at))
        })
        .collect::<contactbook::Result<Vec<_>>>()?;

    if json {
        let keys: Vec<_> = entries
            .iter()
            .map(|(key, updated_at)| serde_json::json!({ "key": key, "updated_at": updated_at }))
            .collect();
        let status = serde_json::json!({
            "database_path": path,
            "contacts": contacts,
            "entries": stats.total_entries,
            "created_at": stats.created_at,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
            "keys": keys,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
        };
        println!("cbook status");
        println!("------------");
        println!("Database:      {}", path.display());
        println!("Contacts:      {contacts}");
        println!("Entries:       {}", stats.total_entries);
        println!("Created:       {}", fmt_time(stats.created_at));
        println!("Last updated:  {}", fmt_time(stats.last_updated));
        println!("Size:          {} bytes", stats.db_size_bytes);
        for (key, updated_at) in entries {
            println!("  {key:<20} {}", fmt_time(updated_at));
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!("  Storage key:      {}", config.storage.storage_key);
                println!();
                println!("[Contacts]");
                println!("  Require email:    {}", config.contacts.require_email);
                println!(
                    "  Profile id:       {}",
                    config.contacts.profile_id.as_deref().unwrap_or("-")
                );
                println!("  Default title:    {}", config.contacts.default_title);
                println!("  Avatar base URL:  {}", config.contacts.avatar_base_url);
                println!();
                println!("[Search]");
                println!("  Match email:      {}", config.search.match_email);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)).and_then(|c| c.validate()) {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
