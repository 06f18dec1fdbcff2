//! The contact manager: owns the contact collection and keeps it, the
//! rendered page and the remote API in step.
//!
//! Each public method corresponds to one user interaction. Methods that
//! talk to the API mutate the collection only after the server confirms,
//! and leave the collection and page untouched on failure.

use thiserror::Error;

use crate::api::{ApiError, ContactApi};
use crate::contact::{Contact, ContactId, FieldMap};
use crate::form::{ContactForm, FormHeading};
use crate::page::{Page, Panel, RenderedRow};
use crate::search::{self, TagFilter};
use crate::tags::{self, normalize_tag_string};
use crate::templates::Templates;
use crate::validator::FormValidator;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("no contact with id {0}")]
    UnknownContact(ContactId),

    #[error("no contact is awaiting delete confirmation")]
    NothingToDelete,

    #[error("update of contact {requested} answered with contact {returned}")]
    MismatchedId {
        requested: ContactId,
        returned: ContactId,
    },
}

/// Result of a form submission that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Constraint validation failed; nothing was sent. Lists the required
    /// fields now marked invalid.
    Invalid(Vec<String>),
    Created(ContactId),
    Updated(ContactId),
}

pub struct ContactManager<A> {
    api: A,
    templates: Templates,
    contacts: Vec<Contact>,
    validator: FormValidator,
    page: Page,
}

impl<A: ContactApi> ContactManager<A> {
    /// Fetch the initial collection and build a manager around it.
    pub async fn load(api: A, templates: Templates) -> Result<Self, ManagerError> {
        let contacts = api.list().await?;
        tracing::info!(count = contacts.len(), "loaded contacts");
        Self::new(api, templates, contacts)
    }

    pub fn new(api: A, templates: Templates, contacts: Vec<Contact>) -> Result<Self, ManagerError> {
        Self::with_form(api, templates, contacts, ContactForm::standard())
    }

    pub fn with_form(
        api: A,
        templates: Templates,
        contacts: Vec<Contact>,
        form: ContactForm,
    ) -> Result<Self, ManagerError> {
        let validator = FormValidator::new(&form);
        let mut manager = Self {
            api,
            templates,
            contacts: Vec::with_capacity(contacts.len()),
            validator,
            page: Page::new(form),
        };
        for contact in contacts {
            manager.upsert(contact);
        }

        let all = manager.contacts.clone();
        manager.render_contacts(&all)?;
        manager.populate_tag_select();
        Ok(manager)
    }

    // -- Accessors --

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    // -- Rendering --

    /// Replace every rendered row with `subset` and show the list panel.
    pub fn render_contacts(&mut self, subset: &[Contact]) -> Result<(), ManagerError> {
        let rows = subset
            .iter()
            .map(|contact| {
                Ok(RenderedRow {
                    id: contact.id,
                    markup: self.templates.render_row(contact)?,
                })
            })
            .collect::<Result<Vec<_>, minijinja::Error>>()?;

        self.page.clear_rows();
        self.page.rows.extend(rows);
        self.show_contacts_view(true);
        Ok(())
    }

    /// Toggle between the list panel (`true`) and the form panel.
    pub fn show_contacts_view(&mut self, show: bool) {
        if show {
            self.page.panel = Panel::Contacts;
            self.page.empty_state_visible = self.page.rows.is_empty();
        } else {
            self.page.panel = Panel::Form;
            self.page.empty_state_visible = false;
        }
    }

    /// Rebuild the tag-select options from the collection. Rebuilding
    /// selects "Any tags" again.
    pub fn populate_tag_select(&mut self) {
        self.page.tag_options = tags::collect_tag_options(&self.contacts);
        self.page.selected_tag = TagFilter::Any;
    }

    /// Show "Any tags" in the selector without filtering.
    pub fn reset_tag_select(&mut self) {
        self.page.selected_tag = TagFilter::Any;
    }

    // -- Form --

    /// Open an empty form in create mode, dropping any editing target a
    /// previous edit left behind.
    pub fn begin_create(&mut self) {
        self.reset_form();
        self.show_contacts_view(false);
    }

    pub fn begin_edit(&mut self, id: ContactId) -> Result<(), ManagerError> {
        let contact = self.contact(id).cloned().ok_or(ManagerError::UnknownContact(id))?;

        let form = &mut self.page.form;
        form.heading = FormHeading::Edit;
        form.populate(&contact);
        form.editing = Some(id);

        self.show_contacts_view(false);
        Ok(())
    }

    /// Set the value of a form input. Returns `false` for unknown fields.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.page.form.set_value(name, value)
    }

    /// Validate and send the form: an update when it carries an editing
    /// target, otherwise a create.
    ///
    /// On success the form is reset (which also runs [`Self::cancel`]) and
    /// the tag options are rebuilt.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ManagerError> {
        self.validator.reset_validation(&mut self.page.form);
        if !self.validator.check_validity(&mut self.page.form) {
            let invalid = self.validator.invalid_fields(&self.page.form);
            tracing::debug!(?invalid, "form failed validation");
            return Ok(SubmitOutcome::Invalid(invalid));
        }

        let mut fields = self.page.form.values();
        if let Some(tags) = fields.get_mut("tags") {
            *tags = normalize_tag_string(tags);
        }

        let outcome = match self.page.form.editing {
            Some(id) => SubmitOutcome::Updated(self.update_existing_contact(id, &fields).await?),
            None => SubmitOutcome::Created(self.create_new_contact(&fields).await?),
        };

        self.cancel();
        self.populate_tag_select();
        Ok(outcome)
    }

    async fn update_existing_contact(
        &mut self,
        id: ContactId,
        fields: &FieldMap,
    ) -> Result<ContactId, ManagerError> {
        let updated = self.api.update(id, fields).await?;
        if updated.id != id {
            return Err(ManagerError::MismatchedId {
                requested: id,
                returned: updated.id,
            });
        }
        tracing::info!(%id, "contact updated");

        let markup = self.templates.render_row(&updated)?;
        self.upsert(updated);
        self.page.replace_row(id, markup);
        Ok(id)
    }

    async fn create_new_contact(&mut self, fields: &FieldMap) -> Result<ContactId, ManagerError> {
        let created = self.api.create(fields).await?;
        let id = created.id;
        tracing::info!(%id, "contact created");

        let markup = self.templates.render_row(&created)?;
        if self.upsert(created) {
            self.page.replace_row(id, markup);
        } else {
            self.page.append_row(id, markup);
        }
        Ok(id)
    }

    /// Form reset: clear the inputs, drop the editing target and return to
    /// the list panel.
    pub fn cancel(&mut self) {
        self.reset_form();
        self.show_contacts_view(true);
    }

    fn reset_form(&mut self) {
        let form = &mut self.page.form;
        form.clear_values();
        form.heading = FormHeading::Create;
        form.editing = None;
        self.validator.reset_validation(form);
    }

    // -- Delete --

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: ContactId) -> Result<(), ManagerError> {
        if self.contact(id).is_none() {
            return Err(ManagerError::UnknownContact(id));
        }
        self.page.pending_delete = Some(id);
        Ok(())
    }

    pub fn dismiss_delete(&mut self) {
        self.page.pending_delete = None;
    }

    /// Delete the contact awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> Result<ContactId, ManagerError> {
        let id = self.page.pending_delete.take().ok_or(ManagerError::NothingToDelete)?;
        self.delete_contact(id).await?;
        Ok(id)
    }

    /// Delete `id` on the server, then drop it from the collection and page.
    pub async fn delete_contact(&mut self, id: ContactId) -> Result<(), ManagerError> {
        self.api.delete(id).await?;
        tracing::info!(%id, "contact deleted");

        self.contacts.retain(|c| c.id != id);
        self.page.remove_row(id);
        self.show_contacts_view(true);
        self.populate_tag_select();
        Ok(())
    }

    // -- Search and filter --

    /// Render the contacts whose name starts with `term`.
    pub fn search(&mut self, term: &str) -> Result<(), ManagerError> {
        self.page.search = term.to_string();
        let hits = search::filter_by_name(&self.contacts, term);
        self.render_contacts(&hits)?;
        self.reset_tag_select();
        Ok(())
    }

    /// Render the contacts selected by `filter` and clear the search input.
    pub fn filter_by_tag(&mut self, filter: TagFilter) -> Result<(), ManagerError> {
        let hits = search::filter_by_tag(&self.contacts, &filter);
        self.render_contacts(&hits)?;
        self.page.selected_tag = filter;
        self.page.search.clear();
        Ok(())
    }

    /// Insert `contact`, replacing any entry with the same id. Returns
    /// whether an entry was replaced.
    fn upsert(&mut self, contact: Contact) -> bool {
        match self.contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(existing) => {
                *existing = contact;
                true
            }
            None => {
                self.contacts.push(contact);
                false
            }
        }
    }
}
