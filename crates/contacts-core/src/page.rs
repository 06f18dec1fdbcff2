//! The rendered page: what a front end draws after every handler.

use crate::contact::ContactId;
use crate::form::ContactForm;
use crate::search::TagFilter;

/// Which of the two mutually exclusive panels is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Contacts,
    Form,
}

/// A rendered contact row, addressed by the id of the contact it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub id: ContactId,
    pub markup: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub panel: Panel,
    pub empty_state_visible: bool,
    pub rows: Vec<RenderedRow>,
    /// Tag-select options, excluding the synthetic "Any tags" entry.
    pub tag_options: Vec<String>,
    pub selected_tag: TagFilter,
    pub search: String,
    pub form: ContactForm,
    /// Contact awaiting delete confirmation.
    pub pending_delete: Option<ContactId>,
}

impl Page {
    pub fn new(form: ContactForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn row(&self, id: ContactId) -> Option<&RenderedRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Replace the markup of `id`'s row in place. Returns `false` when the
    /// row is not currently rendered.
    pub fn replace_row(&mut self, id: ContactId, markup: String) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.markup = markup;
                true
            }
            None => false,
        }
    }

    pub fn append_row(&mut self, id: ContactId, markup: String) {
        self.rows.push(RenderedRow { id, markup });
    }

    pub fn remove_row(&mut self, id: ContactId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.rows.len() != before
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// Every option of the tag select, "Any tags" first.
    pub fn tag_select_options(&self) -> Vec<TagFilter> {
        std::iter::once(TagFilter::Any)
            .chain(self.tag_options.iter().map(|t| TagFilter::Tag(t.clone())))
            .collect()
    }

    pub fn rendered_ids(&self) -> Vec<ContactId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}
