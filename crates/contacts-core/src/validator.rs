//! Visual validation state for the contact form.

use crate::form::ContactForm;

/// Tracks the form's required fields and toggles their invalid markers.
///
/// Validity itself is decided by each field's native constraints; the
/// validator only reflects failures on required fields, together with the
/// label and hint tied to them.
#[derive(Debug, Clone)]
pub struct FormValidator {
    required: Vec<String>,
}

impl FormValidator {
    pub fn new(form: &ContactForm) -> Self {
        let required = form
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect();
        Self { required }
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Run constraint validation over the whole form.
    ///
    /// Every failing required field gets marked invalid. Returns whether the
    /// form as a whole is valid.
    pub fn check_validity(&self, form: &mut ContactForm) -> bool {
        let failing: Vec<String> = form
            .fields
            .iter()
            .filter(|f| !f.satisfies_constraints())
            .map(|f| f.name.clone())
            .collect();
        for name in &failing {
            self.mark_invalid(form, name);
        }
        failing.is_empty()
    }

    /// React to an invalid event on `name`. Non-required fields are ignored.
    pub fn mark_invalid(&self, form: &mut ContactForm, name: &str) {
        if !self.required.iter().any(|r| r == name) {
            return;
        }
        if let Some(field) = form.field_mut(name) {
            field.markers.set(true);
        }
    }

    /// Clear the invalid markers of every required field.
    pub fn reset_validation(&self, form: &mut ContactForm) {
        for name in &self.required {
            if let Some(field) = form.field_mut(name) {
                field.markers.set(false);
            }
        }
    }

    /// Names of required fields currently marked invalid.
    pub fn invalid_fields(&self, form: &ContactForm) -> Vec<String> {
        self.required
            .iter()
            .filter(|name| form.field(name).is_some_and(|f| f.markers.any()))
            .cloned()
            .collect()
    }
}
