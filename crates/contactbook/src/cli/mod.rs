//! Command-line interface for contactbook.
//!
//! This module provides the CLI structure for the `cbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, EditCommand, LinkCommand, LinkKindArg, ListCommand,
    OutputFormat, ShowCommand, StatusCommand,
};

/// cbook - Keep your contacts in order
///
/// Lists contacts in alphabetical sections, searches them, and adds, edits
/// or removes records. Every change is saved to the local database.
#[derive(Debug, Parser)]
#[command(name = "cbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List contacts in alphabetical sections
    List(ListCommand),

    /// Show a single contact
    Show(ShowCommand),

    /// Add a contact
    Add(AddCommand),

    /// Edit a contact
    Edit(EditCommand),

    /// Delete a contact
    Delete(DeleteCommand),

    /// Print a call, message or email link for a contact
    Link(LinkCommand),

    /// Replace all contacts with the bundled defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
