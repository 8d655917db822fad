//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::contact::ContactDraft;
use crate::links::ContactLink;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show contacts whose name (or email) contains this text
    pub query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Contact id
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Contact fields accepted by `add`.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Phone number
    #[arg(short, long)]
    pub phone: String,

    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// Role label
    #[arg(short, long)]
    pub title: Option<String>,

    /// Avatar URI (derived from the id when omitted)
    #[arg(long)]
    pub avatar: Option<String>,
}

impl From<AddCommand> for ContactDraft {
    fn from(cmd: AddCommand) -> Self {
        Self {
            name: cmd.name,
            phone: cmd.phone,
            email: cmd.email,
            avatar: cmd.avatar,
            title: cmd.title,
        }
    }
}

/// Edit command arguments. Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Contact id
    pub id: String,

    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New phone number
    #[arg(short, long)]
    pub phone: Option<String>,

    /// New email address (empty to clear)
    #[arg(short, long)]
    pub email: Option<String>,

    /// New role label (empty to clear)
    #[arg(short, long)]
    pub title: Option<String>,

    /// New avatar URI
    #[arg(long)]
    pub avatar: Option<String>,
}

impl EditCommand {
    /// Overlay the given fields onto a draft of the current record.
    #[must_use]
    pub fn apply_to(self, mut draft: ContactDraft) -> ContactDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(email) = self.email {
            draft.email = Some(email);
        }
        if let Some(title) = self.title {
            draft.title = Some(title);
        }
        if self.avatar.is_some() {
            draft.avatar = self.avatar;
        }
        draft
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Contact id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Link command arguments.
#[derive(Debug, Args)]
pub struct LinkCommand {
    /// Contact id
    pub id: String,

    /// How to reach the contact
    #[arg(value_enum)]
    pub kind: LinkKindArg,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Link kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkKindArg {
    /// Phone call
    Call,
    /// Text message
    Message,
    /// Email
    Email,
}

impl From<LinkKindArg> for ContactLink {
    fn from(arg: LinkKindArg) -> Self {
        match arg {
            LinkKindArg::Call => Self::Call,
            LinkKindArg::Message => Self::Message,
            LinkKindArg::Email => Self::Email,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(id: &str) -> EditCommand {
        EditCommand {
            id: id.to_string(),
            name: None,
            phone: None,
            email: None,
            title: None,
            avatar: None,
        }
    }

    #[test]
    fn test_link_kind_arg_conversion() {
        assert_eq!(ContactLink::from(LinkKindArg::Call), ContactLink::Call);
        assert_eq!(ContactLink::from(LinkKindArg::Message), ContactLink::Message);
        assert_eq!(ContactLink::from(LinkKindArg::Email), ContactLink::Email);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_add_command_into_draft() {
        let cmd = AddCommand {
            name: "Bo".to_string(),
            phone: "123".to_string(),
            email: Some("b@x.com".to_string()),
            title: None,
            avatar: None,
        };
        let draft = ContactDraft::from(cmd);
        assert_eq!(draft, ContactDraft::new("Bo", "123").with_email("b@x.com"));
    }

    #[test]
    fn test_edit_without_fields_keeps_draft() {
        let base = ContactDraft::new("Ann", "111").with_email("a@x.com");
        assert_eq!(edit("1").apply_to(base.clone()), base);
    }

    #[test]
    fn test_edit_overlays_given_fields() {
        let base = ContactDraft::new("Ann", "111")
            .with_email("a@x.com")
            .with_avatar("ann.png");
        let cmd = EditCommand {
            phone: Some("222".to_string()),
            title: Some("Chef".to_string()),
            ..edit("1")
        };

        let draft = cmd.apply_to(base);
        assert_eq!(draft.name, "Ann");
        assert_eq!(draft.phone, "222");
        assert_eq!(draft.title.as_deref(), Some("Chef"));
        assert_eq!(draft.avatar.as_deref(), Some("ann.png"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        assert!(format!("{cmd:?}").contains("Show"));
    }
}
