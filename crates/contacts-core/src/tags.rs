//! Tag sets and the delimited-string wire format.
//!
//! The API stores a contact's tags as a single `", "`-separated string.
//! Inside the client they are an ordered, duplicate-free [`TagSet`]; the
//! string form only exists at the serialization boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::contact::Contact;

/// Separator used by the canonical wire format.
pub const TAG_SEPARATOR: &str = ", ";

/// Insertion-ordered set of non-empty tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-delimited tag string.
    ///
    /// Pieces are trimmed, empty pieces dropped, and duplicates collapse onto
    /// their first occurrence.
    pub fn parse(input: &str) -> Self {
        let mut set = Self::new();
        for piece in input.split(',') {
            set.insert(piece);
        }
        set
    }

    /// Add a tag. Returns `false` if it was empty or already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(TAG_SEPARATOR))
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(TagSet::parse).unwrap_or_default())
    }
}

/// Rewrite a user-entered tag string into canonical wire form.
///
/// `"a, b,c ,  d"` becomes `"a, b, c, d"`.
pub fn normalize_tag_string(input: &str) -> String {
    TagSet::parse(input).to_string()
}

/// Distinct tags across `contacts`, in order of first appearance.
pub fn collect_tag_options(contacts: &[Contact]) -> Vec<String> {
    let mut all = TagSet::new();
    for contact in contacts {
        for tag in contact.tags.iter() {
            all.insert(tag);
        }
    }
    all.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactId;

    fn contact(id: u64, tags: &str) -> Contact {
        Contact {
            id: ContactId(id),
            full_name: format!("Contact {id}"),
            tags: TagSet::parse(tags),
            fields: Default::default(),
        }
    }

    #[test]
    fn normalizes_spacing() {
        assert_eq!(normalize_tag_string("a, b,c ,  d"), "a, b, c, d");
        assert_eq!(normalize_tag_string("red,  blue"), "red, blue");
    }

    #[test]
    fn drops_empty_and_duplicate_pieces() {
        assert_eq!(normalize_tag_string(" , work,, work ,home,"), "work, home");
        assert_eq!(normalize_tag_string(""), "");
        assert!(TagSet::parse("  ").is_empty());
    }

    #[test]
    fn canonical_string_parses_to_same_set() {
        let set = TagSet::parse("x, y");
        assert_eq!(set.to_string(), "x, y");
        assert_eq!(TagSet::parse(&set.to_string()), set);
    }

    #[test]
    fn tags_containing_spaces_survive() {
        let set = TagSet::parse("best friend, work");
        assert!(set.contains("best friend"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn tag_options_dedupe_by_first_occurrence() {
        let contacts = vec![contact(1, "x, y"), contact(2, "z, x"), contact(3, ""), contact(4, "y, w")];
        assert_eq!(collect_tag_options(&contacts), ["x", "y", "z", "w"]);
    }

    #[test]
    fn tag_options_empty_collection() {
        assert!(collect_tag_options(&[]).is_empty());
    }
}
