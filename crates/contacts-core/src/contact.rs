//! Contact records as exchanged with the contacts API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tags::TagSet;

/// Server-assigned contact identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ContactId)
    }
}

/// Key -> value mapping collected from a submitted form. Sent as the JSON
/// body of create and update requests.
pub type FieldMap = BTreeMap<String, String>;

/// A single contact.
///
/// `full_name` and `tags` are the only properties the client interprets.
/// Every other property (email, phone number, ...) is carried in `fields`
/// and round-tripped untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Contact {
    /// Look up the property a form field named `name` should display.
    ///
    /// Nulls and nested values are treated as absent.
    pub fn field_value(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "full_name" => Some(self.full_name.clone()),
            "tags" => Some(self.tags.to_string()),
            other => match self.fields.get(other)? {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_extra_fields_opaquely() {
        let contact: Contact = serde_json::from_value(json!({
            "id": 4,
            "full_name": "Naveed Fida",
            "email": "nf@example.com",
            "phone_number": "12345678901",
            "tags": "work, friend"
        }))
        .unwrap();

        assert_eq!(contact.id, ContactId(4));
        assert_eq!(contact.tags.iter().collect::<Vec<_>>(), ["work", "friend"]);
        assert_eq!(contact.field_value("email").as_deref(), Some("nf@example.com"));
        assert_eq!(contact.field_value("tags").as_deref(), Some("work, friend"));
    }

    #[test]
    fn serializes_tags_as_wire_string() {
        let contact = Contact {
            id: ContactId(1),
            full_name: "Alice".to_string(),
            tags: TagSet::parse("x,y"),
            fields: BTreeMap::from([("email".to_string(), json!("a@b.c"))]),
        };
        let value = serde_json::to_value(&contact).unwrap();
        assert_eq!(value["tags"], "x, y");
        assert_eq!(value["email"], "a@b.c");
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn null_tags_and_missing_fields() {
        let contact: Contact =
            serde_json::from_value(json!({ "id": 9, "full_name": "Bob", "tags": null, "phone_number": null }))
                .unwrap();
        assert!(contact.tags.is_empty());
        assert_eq!(contact.field_value("phone_number"), None);
        assert_eq!(contact.field_value("nickname"), None);
    }

    #[test]
    fn numeric_field_values_are_stringified() {
        let contact: Contact =
            serde_json::from_value(json!({ "id": 2, "full_name": "C", "tags": "", "age": 41 })).unwrap();
        assert_eq!(contact.field_value("age").as_deref(), Some("41"));
    }

    #[test]
    fn contact_id_parses_from_str() {
        assert_eq!(" 12 ".parse::<ContactId>().unwrap(), ContactId(12));
        assert!("abc".parse::<ContactId>().is_err());
    }
}
