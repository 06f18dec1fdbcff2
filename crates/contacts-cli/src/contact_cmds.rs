//! `contacts add`, `contacts edit` and `contacts delete`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use contacts_core::api::ContactApi;
use contacts_core::contact::{Contact, ContactId};
use contacts_core::form::{ContactForm, FieldKind, FormField};
use contacts_core::manager::{ContactManager, SubmitOutcome};
use contacts_core::templates::Templates;

/// Parse a `key=value` argument.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}

/// The standard form plus a text field for every extra name in `names`.
fn form_with_fields<'a>(names: impl IntoIterator<Item = &'a str>) -> ContactForm {
    let mut form = ContactForm::standard();
    for name in names {
        if form.field(name).is_none() {
            form.fields.push(FormField::new(name, name, FieldKind::Text));
        }
    }
    form
}

fn fill_and_check(
    manager: &mut ContactManager<impl ContactApi>,
    values: &[(String, String)],
) -> Result<()> {
    for (name, value) in values {
        if !manager.set_field(name, value.as_str()) {
            bail!("unknown field {name:?}");
        }
    }
    Ok(())
}

fn expect_saved(outcome: SubmitOutcome) -> Result<ContactId> {
    match outcome {
        SubmitOutcome::Created(id) | SubmitOutcome::Updated(id) => Ok(id),
        SubmitOutcome::Invalid(fields) => bail!("invalid or missing fields: {}", fields.join(", ")),
    }
}

/// Create a contact from `values` through the contact form.
pub async fn run_add<A: ContactApi>(
    api: A,
    templates: Templates,
    values: &[(String, String)],
) -> Result<ContactId> {
    let contacts = api.list().await.context("failed to load contacts")?;
    let form = form_with_fields(values.iter().map(|(k, _)| k.as_str()));
    let mut manager = ContactManager::with_form(api, templates, contacts, form)?;

    manager.begin_create();
    fill_and_check(&mut manager, values)?;
    let outcome = manager.submit().await.context("failed to create contact")?;
    expect_saved(outcome)
}

/// Change the given fields of contact `id`, keeping the rest as they are.
pub async fn run_edit<A: ContactApi>(
    api: A,
    templates: Templates,
    id: u64,
    changes: &[(String, String)],
) -> Result<ContactId> {
    let id = ContactId(id);
    let contacts = api.list().await.context("failed to load contacts")?;
    let existing: &Contact = contacts
        .iter()
        .find(|c| c.id == id)
        .with_context(|| format!("contact {id} not found"))?;

    let extra: Vec<String> = existing
        .fields
        .keys()
        .cloned()
        .chain(changes.iter().map(|(k, _)| k.clone()))
        .collect();
    let form = form_with_fields(extra.iter().map(String::as_str));
    let mut manager = ContactManager::with_form(api, templates, contacts, form)?;

    manager.begin_edit(id)?;
    fill_and_check(&mut manager, changes)?;
    let outcome = manager.submit().await.context("failed to update contact")?;
    expect_saved(outcome)
}

/// Delete contact `id`, asking on `input` first unless `assume_yes`.
/// Returns whether the contact was deleted.
pub async fn run_delete<A: ContactApi>(
    manager: &mut ContactManager<A>,
    id: u64,
    assume_yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    let id = ContactId(id);
    manager.request_delete(id)?;

    if !assume_yes {
        let name = manager.contact(id).map(|c| c.full_name.clone()).unwrap_or_default();
        write!(out, "Delete contact {id} ({name})? [y/N] ")?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            manager.dismiss_delete();
            writeln!(out, "Aborted.")?;
            return Ok(false);
        }
    }

    manager.confirm_delete().await.context("failed to delete contact")?;
    Ok(true)
}
