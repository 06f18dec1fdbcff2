//! Compiled contact templates.
//!
//! Two templates are keyed by id: the contact list and the single contact
//! row. The row template is additionally registered as the `contact`
//! partial so the list can compose rows with `{% include "contact" %}`.

use std::io;
use std::path::Path;

use minijinja::{Environment, context};

use crate::contact::Contact;

pub const LIST_TEMPLATE: &str = "contacts-template";
pub const ROW_TEMPLATE: &str = "contact-template";
pub const ROW_PARTIAL: &str = "contact";

const LIST_FILE: &str = "contacts.j2";
const ROW_FILE: &str = "contact.j2";

/// Uncompiled template sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSources {
    pub list: String,
    pub row: String,
}

impl TemplateSources {
    pub fn builtin() -> Self {
        Self {
            list: include_str!("contacts.j2").to_string(),
            row: include_str!("contact.j2").to_string(),
        }
    }

    /// Builtin sources, overridden by `contacts.j2` / `contact.j2` found in
    /// `dir`.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut sources = Self::builtin();
        if let Some(list) = read_optional(&dir.join(LIST_FILE))? {
            sources.list = list;
        }
        if let Some(row) = read_optional(&dir.join(ROW_FILE))? {
            sources.row = row;
        }
        Ok(sources)
    }
}

impl Default for TemplateSources {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// The compiled template set.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile `sources`. Syntax errors surface here rather than at render.
    pub fn compile(sources: TemplateSources) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template_owned(ROW_TEMPLATE, sources.row.clone())?;
        env.add_template_owned(ROW_PARTIAL, sources.row)?;
        env.add_template_owned(LIST_TEMPLATE, sources.list)?;
        Ok(Self { env })
    }

    pub fn builtin() -> Result<Self, minijinja::Error> {
        Self::compile(TemplateSources::builtin())
    }

    /// Markup of a single contact row.
    pub fn render_row(&self, contact: &Contact) -> Result<String, minijinja::Error> {
        let rendered = self.env.get_template(ROW_TEMPLATE)?.render(context! { contact => contact })?;
        Ok(rendered.trim_end().to_string())
    }

    /// Markup of the whole contact list.
    pub fn render_list(&self, contacts: &[Contact]) -> Result<String, minijinja::Error> {
        self.env.get_template(LIST_TEMPLATE)?.render(context! { contacts => contacts })
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}
