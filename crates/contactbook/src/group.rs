//! Alphabetical sectioning of contact lists.
//!
//! Contacts are bucketed by the uppercased first letter of their name and
//! sorted by that title first, then with a locale-aware comparison within
//! the section. Latin letters with diacritics are folded onto their base
//! letter, so `Čarli` sorts between `Carl` and `Cecil` in the `C` section.

use serde::Serialize;

use crate::contact::Contact;

/// Section title used for contacts with an empty name.
pub const FALLBACK_TITLE: &str = "#";

/// A named, ordered group of contacts sharing the same leading letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Uppercased leading letter, or [`FALLBACK_TITLE`].
    pub title: String,
    /// Members in sorted order.
    pub members: Vec<Contact>,
}

/// Sort key for a name: section title, folded, then case-insensitive, then
/// exact. Leading with the title keeps sections in ascending title order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    title: String,
    primary: String,
    secondary: String,
    tertiary: String,
    id: String,
}

impl CollationKey {
    fn new(contact: &Contact) -> Self {
        let name = contact.name.trim_start();
        Self {
            title: section_title(name),
            primary: name.chars().map(fold).collect(),
            secondary: name.to_lowercase(),
            tertiary: name.to_string(),
            id: contact.id.as_str().to_string(),
        }
    }
}

/// Sort contacts by name using the grouper's comparison.
#[must_use]
pub fn sorted(contacts: &[Contact]) -> Vec<Contact> {
    let mut sorted = contacts.to_vec();
    sorted.sort_by_cached_key(CollationKey::new);
    sorted
}

/// Get the section title a name belongs to.
#[must_use]
pub fn section_title(name: &str) -> String {
    match name.trim_start().chars().next() {
        Some(first) => fold(first).to_uppercase().collect(),
        None => FALLBACK_TITLE.to_string(),
    }
}

/// Partition contacts into alphabetical sections.
///
/// Sections come out in ascending title order and their concatenated
/// members equal [`sorted`] of the input.
#[must_use]
pub fn group(contacts: &[Contact]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for contact in sorted(contacts) {
        let title = section_title(&contact.name);
        match sections.last_mut() {
            Some(section) if section.title == title => section.members.push(contact),
            _ => sections.push(Section {
                title,
                members: vec![contact],
            }),
        }
    }

    sections
}

/// Lowercase a character and strip common Latin diacritics.
fn fold(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' | 'ß' | 'ſ' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        'ς' => 'σ',
        other => other,
    }
}
