//! Dashboard application state.
//!
//! Wraps the [`ContactManager`] with the input state only a terminal needs:
//! the highlighted row, the focused form field and whether keystrokes go to
//! the search input.

use std::time::Duration;

use contacts_core::api::ContactApi;
use contacts_core::contact::ContactId;
use contacts_core::form::FormField;
use contacts_core::manager::{ContactManager, ManagerError, SubmitOutcome};
use contacts_core::page::{Page, Panel};

/// Where keystrokes go while the list panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
}

pub struct App<A> {
    pub manager: ContactManager<A>,
    pub mode: Mode,
    pub selected: usize,
    pub focus: usize,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl<A: ContactApi> App<A> {
    pub fn new(manager: ContactManager<A>) -> Self {
        Self {
            manager,
            mode: Mode::Browse,
            selected: 0,
            focus: 0,
            tick_rate: Duration::from_millis(250),
            should_quit: false,
            status_message: None,
        }
    }

    pub fn page(&self) -> &Page {
        self.manager.page()
    }

    pub fn selected_id(&self) -> Option<ContactId> {
        self.page().rows.get(self.selected).map(|r| r.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.page().rows.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn report(&mut self, action: &str, err: ManagerError) {
        tracing::warn!("{action} failed: {err}");
        self.status_message = Some(format!("{action} failed: {err}"));
    }

    // -- Navigation --

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.page().rows.len() {
            self.selected += 1;
        }
    }

    // -- Search and tag filter --

    pub fn start_search(&mut self) {
        self.mode = Mode::Search;
    }

    pub fn finish_search(&mut self) {
        self.mode = Mode::Browse;
    }

    pub fn search_push(&mut self, c: char) {
        let mut term = self.page().search.clone();
        term.push(c);
        self.apply_search(&term);
    }

    pub fn search_pop(&mut self) {
        let mut term = self.page().search.clone();
        term.pop();
        self.apply_search(&term);
    }

    fn apply_search(&mut self, term: &str) {
        if let Err(e) = self.manager.search(term) {
            self.report("Search", e);
        }
        self.selected = 0;
    }

    /// Select the next tag-select option and filter by it.
    pub fn cycle_tag(&mut self) {
        let options = self.page().tag_select_options();
        let next = options
            .iter()
            .position(|o| *o == self.page().selected_tag)
            .map_or(0, |i| (i + 1) % options.len());
        if let Err(e) = self.manager.filter_by_tag(options[next].clone()) {
            self.report("Filter", e);
        }
        self.selected = 0;
    }

    // -- Form --

    pub fn add(&mut self) {
        self.manager.begin_create();
        self.focus = 0;
    }

    pub fn edit_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.manager.begin_edit(id) {
            Ok(()) => self.focus = 0,
            Err(e) => self.report("Edit", e),
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.page().form.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        let len = self.page().form.fields.len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_prev(&mut self) {
        let len = self.page().form.fields.len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let name = field.name.clone();
        let mut value = field.value.clone();
        edit(&mut value);
        self.manager.set_field(&name, value);
    }

    pub fn input_char(&mut self, c: char) {
        self.edit_focused(|value| value.push(c));
    }

    pub fn input_backspace(&mut self) {
        self.edit_focused(|value| {
            value.pop();
        });
    }

    pub async fn submit(&mut self) {
        match self.manager.submit().await {
            Ok(SubmitOutcome::Created(id)) => {
                self.status_message = Some(format!("Contact {id} created"));
            }
            Ok(SubmitOutcome::Updated(id)) => {
                self.status_message = Some(format!("Contact {id} updated"));
            }
            Ok(SubmitOutcome::Invalid(fields)) => {
                self.status_message = Some(format!("Please fix: {}", fields.join(", ")));
                if let Some(pos) = self
                    .page()
                    .form
                    .fields
                    .iter()
                    .position(|f| f.markers.any())
                {
                    self.focus = pos;
                }
            }
            Err(e) => {
                let action = if self.page().form.editing.is_some() {
                    "Update"
                } else {
                    "Create"
                };
                self.report(action, e);
            }
        }
        self.clamp_selection();
    }

    pub fn cancel(&mut self) {
        self.manager.cancel();
        self.clamp_selection();
    }

    pub fn showing_form(&self) -> bool {
        self.page().panel == Panel::Form
    }

    // -- Delete --

    pub fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.manager.request_delete(id) {
            self.report("Delete", e);
        }
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.page().pending_delete.is_some()
    }

    pub async fn confirm_delete(&mut self) {
        match self.manager.confirm_delete().await {
            Ok(id) => self.status_message = Some(format!("Contact {id} deleted")),
            Err(e) => self.report("Delete", e),
        }
        self.clamp_selection();
    }

    pub fn dismiss_delete(&mut self) {
        self.manager.dismiss_delete();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use contacts_core::api::Operation;
    use contacts_core::search::TagFilter;
    use contacts_core::templates::Templates;
    use contacts_test_utils::{FakeContactApi, contact};

    use super::*;

    async fn app(api: &FakeContactApi) -> App<FakeContactApi> {
        let manager = ContactManager::load(api.clone(), Templates::builtin().unwrap())
            .await
            .unwrap();
        App::new(manager)
    }

    fn type_text(app: &mut App<FakeContactApi>, text: &str) {
        for c in text.chars() {
            app.input_char(c);
        }
    }

    #[tokio::test]
    async fn selection_stays_in_bounds() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", ""), contact(2, "Bob", "")]);
        let mut app = app(&api).await;

        app.move_up();
        assert_eq!(app.selected, 0);
        app.move_down();
        app.move_down();
        assert_eq!(app.selected_id(), Some(ContactId(2)));
    }

    #[tokio::test]
    async fn typing_in_search_filters_rows() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", ""), contact(2, "Bob", "")]);
        let mut app = app(&api).await;

        app.start_search();
        app.search_push('b');
        assert_eq!(app.page().rendered_ids(), [ContactId(2)]);
        app.search_pop();
        assert_eq!(app.page().rendered_ids().len(), 2);
    }

    #[tokio::test]
    async fn cycle_tag_walks_options_and_wraps() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", "x"), contact(2, "Bob", "y")]);
        let mut app = app(&api).await;

        app.cycle_tag();
        assert_eq!(app.page().selected_tag, TagFilter::Tag("x".into()));
        assert_eq!(app.page().rendered_ids(), [ContactId(1)]);
        app.cycle_tag();
        app.cycle_tag();
        assert_eq!(app.page().selected_tag, TagFilter::Any);
        assert_eq!(app.page().rendered_ids().len(), 2);
    }

    #[tokio::test]
    async fn create_through_the_form() {
        let api = FakeContactApi::new();
        let mut app = app(&api).await;

        app.add();
        assert!(app.showing_form());
        type_text(&mut app, "Carol");
        app.focus_next();
        type_text(&mut app, "carol@example.com");
        app.focus_next();
        type_text(&mut app, "555-0123");
        app.focus_next();
        type_text(&mut app, "red,  blue");
        app.submit().await;

        assert!(!app.showing_form());
        assert_eq!(app.status_message.as_deref(), Some("Contact 1 created"));
        assert_eq!(api.stored()[0].tags.to_string(), "red, blue");
    }

    #[tokio::test]
    async fn invalid_submit_focuses_first_marked_field() {
        let api = FakeContactApi::new();
        let mut app = app(&api).await;

        app.add();
        type_text(&mut app, "Carol");
        app.submit().await;

        assert!(app.showing_form());
        assert_eq!(app.focused_field().unwrap().name, "email");
        assert!(app.status_message.unwrap().starts_with("Please fix"));
    }

    #[tokio::test]
    async fn failed_update_is_reported() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", "")]);
        let mut app = app(&api).await;
        api.fail_next(Operation::Update, 500);

        app.edit_selected();
        app.input_backspace();
        app.submit().await;

        assert!(app.showing_form());
        let message = app.status_message.unwrap();
        assert!(message.starts_with("Update failed"), "{message}");
    }

    #[tokio::test]
    async fn delete_prompt_then_confirm() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", ""), contact(2, "Bob", "")]);
        let mut app = app(&api).await;
        app.move_down();

        app.request_delete_selected();
        assert!(app.awaiting_confirmation());
        app.confirm_delete().await;

        assert!(!app.awaiting_confirmation());
        assert_eq!(app.page().rendered_ids(), [ContactId(1)]);
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn cancel_returns_to_list() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", "")]);
        let mut app = app(&api).await;
        app.edit_selected();
        assert!(app.showing_form());
        app.cancel();
        assert!(!app.showing_form());
        assert_eq!(app.page().form.editing, None);
    }
}
