//! Client-side search and tag filtering over the contact collection.

use std::fmt;

use crate::contact::Contact;

/// Label of the synthetic tag-select option that disables tag filtering.
pub const ANY_TAGS_LABEL: &str = "Any tags";

/// Current tag-select value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    Any,
    Tag(String),
}

impl TagFilter {
    /// Interpret an option label; `"Any tags"` maps to [`TagFilter::Any`].
    pub fn from_label(label: &str) -> Self {
        if label == ANY_TAGS_LABEL {
            Self::Any
        } else {
            Self::Tag(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Any => ANY_TAGS_LABEL,
            Self::Tag(tag) => tag,
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Self::Any => true,
            Self::Tag(tag) => contact.has_tag(tag),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive literal prefix match of `term` against `name`.
pub fn matches_name_prefix(name: &str, term: &str) -> bool {
    let name = name.to_lowercase();
    let term = term.to_lowercase();
    name.starts_with(&term)
}

/// Contacts whose full name starts with `term`, in collection order.
pub fn filter_by_name(contacts: &[Contact], term: &str) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| matches_name_prefix(&c.full_name, term))
        .cloned()
        .collect()
}

/// Contacts selected by `filter`, in collection order.
pub fn filter_by_tag(contacts: &[Contact], filter: &TagFilter) -> Vec<Contact> {
    contacts.iter().filter(|c| filter.matches(c)).cloned().collect()
}
