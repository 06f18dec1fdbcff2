//! Core of the contacts client: the contact collection, its rendered page
//! model, form validation, and synchronization with the remote contacts API.

pub mod api;
pub mod contact;
pub mod form;
pub mod manager;
pub mod page;
pub mod search;
pub mod tags;
pub mod templates;
pub mod validator;

pub use api::{ApiError, ContactApi, HttpContactApi, Operation};
pub use contact::{Contact, ContactId, FieldMap};
pub use form::{ContactForm, FieldKind, FormField, FormHeading};
pub use manager::{ContactManager, ManagerError, SubmitOutcome};
pub use page::{Page, Panel, RenderedRow};
pub use search::TagFilter;
pub use tags::TagSet;
pub use templates::{Templates, TemplateSources};
pub use validator::FormValidator;
