//! Deep-link targets for contacting someone.
//!
//! Only the URIs are built here. Handing them to the platform's dialer,
//! messaging or mail handler is the caller's business.

use std::sync::OnceLock;

use regex::Regex;

use crate::contact::Contact;
use crate::error::{Error, Result};

/// The ways a contact can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactLink {
    /// Place a phone call (`tel:`).
    Call,
    /// Send a text message (`sms:`).
    Message,
    /// Compose an email (`mailto:`).
    Email,
}

impl std::fmt::Display for ContactLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

impl ContactLink {
    fn kind(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Message => "message",
            Self::Email => "email",
        }
    }

    /// Build the URI for reaching `contact` this way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LinkUnavailable`] if the contact has no usable phone
    /// number or email address for this link.
    pub fn uri(self, contact: &Contact) -> Result<String> {
        let unavailable = || Error::LinkUnavailable {
            kind: self.kind(),
            id: contact.id.to_string(),
        };

        match self {
            Self::Call | Self::Message => {
                let number = dialable(&contact.phone);
                if number.is_empty() {
                    return Err(unavailable());
                }
                let scheme = if self == Self::Call { "tel" } else { "sms" };
                Ok(format!("{scheme}:{number}"))
            }
            Self::Email => contact
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(|e| format!("mailto:{e}"))
                .ok_or_else(unavailable),
        }
    }
}

/// Strip everything a dialer would not accept from a phone number.
#[must_use]
pub fn dialable(phone: &str) -> String {
    static NON_DIALABLE: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIALABLE.get_or_init(|| Regex::new(r"[^0-9+*#]").expect("Invalid regex pattern"));
    re.replace_all(phone, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{ContactDraft, ContactId};

    fn contact(phone: &str, email: Option<&str>) -> Contact {
        let mut draft = ContactDraft::new("Ann", phone);
        draft.email = email.map(String::from);
        Contact::from_draft(ContactId::from("1"), draft, "a/")
    }

    #[test]
    fn test_dialable() {
        assert_eq!(dialable("+1 (555) 010-0100"), "+15550100100");
        assert_eq!(dialable("*31#"), "*31#");
        assert_eq!(dialable("call me"), "");
    }

    #[test]
    fn test_call_and_message_uris() {
        let c = contact("+44 20 7946 0018", None);
        assert_eq!(ContactLink::Call.uri(&c).unwrap(), "tel:+442079460018");
        assert_eq!(ContactLink::Message.uri(&c).unwrap(), "sms:+442079460018");
    }

    #[test]
    fn test_email_uri() {
        let c = contact("1", Some("ann@x.com"));
        assert_eq!(ContactLink::Email.uri(&c).unwrap(), "mailto:ann@x.com");
    }

    #[test]
    fn test_missing_email_is_unavailable() {
        let err = ContactLink::Email.uri(&contact("1", None)).unwrap_err();
        assert!(matches!(err, Error::LinkUnavailable { kind: "email", .. }));
    }

    #[test]
    fn test_undialable_phone_is_unavailable() {
        let err = ContactLink::Call.uri(&contact("n/a", None)).unwrap_err();
        assert!(err.to_string().contains("call"));
    }

    #[test]
    fn test_link_display() {
        assert_eq!(ContactLink::Call.to_string(), "call");
        assert_eq!(ContactLink::Message.to_string(), "message");
        assert_eq!(ContactLink::Email.to_string(), "email");
    }
}
