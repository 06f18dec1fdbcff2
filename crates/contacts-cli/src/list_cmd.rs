//! `contacts list` and `contacts tags`.

use std::io::Write;

use anyhow::Result;

use contacts_core::api::ContactApi;
use contacts_core::contact::Contact;
use contacts_core::manager::ContactManager;
use contacts_core::search::TagFilter;

/// Which subset `contacts list` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Search(String),
    Tag(TagFilter),
}

impl ListFilter {
    pub fn from_args(search: Option<String>, tag: Option<String>) -> Self {
        match (search, tag) {
            (Some(term), _) => Self::Search(term),
            (None, Some(tag)) => Self::Tag(TagFilter::from_label(&tag)),
            (None, None) => Self::All,
        }
    }
}

/// Apply `filter` and print the rendered subset through the list template.
pub fn run_list<A: ContactApi>(
    manager: &mut ContactManager<A>,
    filter: &ListFilter,
    out: &mut impl Write,
) -> Result<()> {
    match filter {
        ListFilter::All => {}
        ListFilter::Search(term) => manager.search(term)?,
        ListFilter::Tag(tag) => manager.filter_by_tag(tag.clone())?,
    }

    let shown: Vec<Contact> = manager
        .page()
        .rendered_ids()
        .into_iter()
        .filter_map(|id| manager.contact(id).cloned())
        .collect();

    let listing = manager.templates().render_list(&shown)?;
    write!(out, "{listing}")?;
    if !listing.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Print every tag-select option, one per line.
pub fn run_tags<A: ContactApi>(manager: &ContactManager<A>, out: &mut impl Write) -> Result<()> {
    for option in manager.page().tag_select_options() {
        writeln!(out, "{option}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use contacts_core::templates::Templates;
    use contacts_test_utils::{FakeContactApi, contact};

    use super::*;

    async fn manager() -> ContactManager<FakeContactApi> {
        let api = FakeContactApi::with_contacts(vec![
            contact(1, "Alice", "x, y"),
            contact(2, "alice2", "y"),
            contact(3, "Bob", "z"),
        ]);
        ContactManager::load(api, Templates::builtin().unwrap()).await.unwrap()
    }

    fn output(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn filter_from_args() {
        assert_eq!(ListFilter::from_args(None, None), ListFilter::All);
        assert_eq!(
            ListFilter::from_args(Some("al".into()), None),
            ListFilter::Search("al".into())
        );
        assert_eq!(
            ListFilter::from_args(None, Some("Any tags".into())),
            ListFilter::Tag(TagFilter::Any)
        );
    }

    #[tokio::test]
    async fn lists_all_contacts() {
        let mut manager = manager().await;
        let out = output(|buf| run_list(&mut manager, &ListFilter::All, buf).unwrap());
        assert!(out.contains("#1  Alice"));
        assert!(out.contains("#3  Bob"));
    }

    #[tokio::test]
    async fn lists_search_hits() {
        let mut manager = manager().await;
        let out = output(|buf| run_list(&mut manager, &ListFilter::Search("AL".into()), buf).unwrap());
        assert!(out.contains("Alice"));
        assert!(out.contains("alice2"));
        assert!(!out.contains("Bob"));
    }

    #[tokio::test]
    async fn lists_tag_hits_and_empty_state() {
        let mut manager = manager().await;
        let filter = ListFilter::Tag(TagFilter::Tag("z".into()));
        let out = output(|buf| run_list(&mut manager, &filter, buf).unwrap());
        assert!(out.contains("Bob"));
        assert!(!out.contains("Alice"));

        let filter = ListFilter::Tag(TagFilter::Tag("nope".into()));
        let out = output(|buf| run_list(&mut manager, &filter, buf).unwrap());
        assert!(out.contains("There are no contacts."));
    }

    #[tokio::test]
    async fn tags_lists_options_in_first_seen_order() {
        let manager = manager().await;
        let out = output(|buf| run_tags(&manager, buf).unwrap());
        assert_eq!(out, "Any tags\nx\ny\nz\n");
    }
}
