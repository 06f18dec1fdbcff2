//! The create/edit contact form.

use crate::contact::{Contact, ContactId, FieldMap};

/// Input type of a form field. Determines the host-native constraint check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
}

/// Visual "invalid" state of a field and the label and hint it is tied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMarkers {
    pub input: bool,
    pub label: bool,
    pub hint: bool,
}

impl FieldMarkers {
    pub fn set(&mut self, invalid: bool) {
        self.input = invalid;
        self.label = invalid;
        self.hint = invalid;
    }

    pub fn any(&self) -> bool {
        self.input || self.label || self.hint
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub hint: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub markers: FieldMarkers,
}

impl FormField {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            hint: String::new(),
            kind,
            required: false,
            value: String::new(),
            markers: FieldMarkers::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    /// Constraint validation as a browser performs it for `required` and
    /// `type="email"` inputs.
    pub fn satisfies_constraints(&self) -> bool {
        if self.value.is_empty() {
            return !self.required;
        }
        match self.kind {
            FieldKind::Email => looks_like_email(&self.value),
            FieldKind::Text | FieldKind::Tel => true,
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Form heading; doubles as the visible create/edit mode indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormHeading {
    #[default]
    Create,
    Edit,
}

impl FormHeading {
    pub fn title(self) -> &'static str {
        match self {
            Self::Create => "Create Contact",
            Self::Edit => "Edit Contact",
        }
    }
}

/// Transient form state.
///
/// `editing` is the editing-target marker: when set, submitting updates
/// that contact, otherwise a new contact is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub fields: Vec<FormField>,
    pub editing: Option<ContactId>,
    pub heading: FormHeading,
}

impl ContactForm {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            editing: None,
            heading: FormHeading::Create,
        }
    }

    /// Full name, email, phone number and tags.
    pub fn standard() -> Self {
        Self::new(vec![
            FormField::new("full_name", "Full name", FieldKind::Text)
                .required()
                .with_hint("Please enter the full name."),
            FormField::new("email", "Email address", FieldKind::Email)
                .required()
                .with_hint("Please enter a valid email."),
            FormField::new("phone_number", "Telephone number", FieldKind::Tel)
                .required()
                .with_hint("Please enter a valid phone number."),
            FormField::new("tags", "Tags", FieldKind::Text).with_hint("Comma separated, e.g. work, friend"),
        ])
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Set a field's value. Returns `false` for an unknown field name.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Current values of every field.
    pub fn values(&self) -> FieldMap {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    /// Fill every field from the contact property of the same name.
    pub fn populate(&mut self, contact: &Contact) {
        for field in &mut self.fields {
            field.value = contact.field_value(&field.name).unwrap_or_default();
        }
    }

    pub fn clear_values(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::standard()
    }
}
