//! Shared test utilities for the contacts workspace.
//!
//! [`FakeContactApi`] is an in-memory contacts store implementing
//! [`ContactApi`]. The same store can be served over HTTP with
//! [`spawn_fake_server`], so `HttpContactApi` is exercised against the real
//! REST contract:
//!
//! | call | success |
//! |---|---|
//! | `GET /api/contacts` | 200 |
//! | `POST /api/contacts` | 201 |
//! | `PUT /api/contacts/{id}` | 201 |
//! | `DELETE /api/contacts/{id}` | 204 |
//!
//! Any operation can be scripted to answer a different status once with
//! [`FakeContactApi::fail_next`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinHandle;

use contacts_core::api::{ApiError, ContactApi, Operation};
use contacts_core::contact::{Contact, ContactId, FieldMap};

/// One call received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub operation: Operation,
    pub id: Option<ContactId>,
    pub fields: Option<FieldMap>,
}

#[derive(Debug, Default)]
struct FakeState {
    contacts: Vec<Contact>,
    next_id: u64,
    scripted: HashMap<Operation, u16>,
    requests: Vec<RecordedRequest>,
}

impl FakeState {
    fn record(&mut self, operation: Operation, id: Option<ContactId>, fields: Option<&FieldMap>) -> Result<(), u16> {
        self.requests.push(RecordedRequest {
            operation,
            id,
            fields: fields.cloned(),
        });
        match self.scripted.remove(&operation) {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    fn list(&mut self) -> Result<Vec<Contact>, u16> {
        self.record(Operation::List, None, None)?;
        Ok(self.contacts.clone())
    }

    fn create(&mut self, fields: &FieldMap) -> Result<Contact, u16> {
        self.record(Operation::Create, None, Some(fields))?;
        self.next_id += 1;
        let contact = contact_from_fields(ContactId(self.next_id), fields);
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    fn update(&mut self, id: ContactId, fields: &FieldMap) -> Result<Contact, u16> {
        self.record(Operation::Update, Some(id), Some(fields))?;
        let contact = contact_from_fields(id, fields);
        let existing = self.contacts.iter_mut().find(|c| c.id == id).ok_or(404u16)?;
        *existing = contact.clone();
        Ok(contact)
    }

    fn delete(&mut self, id: ContactId) -> Result<(), u16> {
        self.record(Operation::Delete, Some(id), None)?;
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        if self.contacts.len() == before {
            return Err(404);
        }
        Ok(())
    }
}

/// In-memory contacts API. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct FakeContactApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeContactApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `contacts`. New ids continue after the largest
    /// seeded id.
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let next_id = contacts.iter().map(|c| c.id.0).max().unwrap_or(0);
        let state = FakeState {
            contacts,
            next_id,
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer the next `operation` call with `status` instead of handling it.
    pub fn fail_next(&self, operation: Operation, status: u16) {
        self.lock().scripted.insert(operation, status);
    }

    /// Contacts currently stored.
    pub fn stored(&self) -> Vec<Contact> {
        self.lock().contacts.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }
}

fn unexpected(operation: Operation, status: u16) -> ApiError {
    ApiError::UnexpectedStatus {
        operation,
        status,
        body: String::new(),
    }
}

#[async_trait]
impl ContactApi for FakeContactApi {
    async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        self.lock().list().map_err(|s| unexpected(Operation::List, s))
    }

    async fn create(&self, fields: &FieldMap) -> Result<Contact, ApiError> {
        self.lock().create(fields).map_err(|s| unexpected(Operation::Create, s))
    }

    async fn update(&self, id: ContactId, fields: &FieldMap) -> Result<Contact, ApiError> {
        self.lock().update(id, fields).map_err(|s| unexpected(Operation::Update, s))
    }

    async fn delete(&self, id: ContactId) -> Result<(), ApiError> {
        self.lock().delete(id).map_err(|s| unexpected(Operation::Delete, s))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build the contact a server would store for a submitted field map.
pub fn contact_from_fields(id: ContactId, fields: &FieldMap) -> Contact {
    let mut object = serde_json::Map::new();
    for (key, value) in fields {
        object.insert(key.clone(), json!(value));
    }
    object.insert("id".to_string(), json!(id.0));
    serde_json::from_value(serde_json::Value::Object(object))
        .expect("field map always deserializes into a contact")
}

/// A contact with a generated email and phone number.
pub fn contact(id: u64, full_name: &str, tags: &str) -> Contact {
    serde_json::from_value(json!({
        "id": id,
        "full_name": full_name,
        "email": format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
        "phone_number": format!("555-01{:02}", id % 100),
        "tags": tags,
    }))
    .expect("fixture contact is valid")
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

fn status_response(status: u16) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(json!({ "error": format!("scripted status {status}") }))).into_response()
}

/// Router serving `api`'s store over the contacts REST contract.
pub fn build_router(api: FakeContactApi) -> Router {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route("/api/contacts/{id}", axum::routing::put(update_contact).delete(delete_contact))
        .with_state(api)
}

async fn list_contacts(State(api): State<FakeContactApi>) -> Response {
    match api.lock().list() {
        Ok(contacts) => (StatusCode::OK, Json(contacts)).into_response(),
        Err(status) => status_response(status),
    }
}

async fn create_contact(State(api): State<FakeContactApi>, Json(fields): Json<FieldMap>) -> Response {
    match api.lock().create(&fields) {
        Ok(contact) => (StatusCode::CREATED, Json(contact)).into_response(),
        Err(status) => status_response(status),
    }
}

async fn update_contact(
    State(api): State<FakeContactApi>,
    Path(id): Path<u64>,
    Json(fields): Json<FieldMap>,
) -> Response {
    match api.lock().update(ContactId(id), &fields) {
        Ok(contact) => (StatusCode::CREATED, Json(contact)).into_response(),
        Err(status) => status_response(status),
    }
}

async fn delete_contact(State(api): State<FakeContactApi>, Path(id): Path<u64>) -> Response {
    match api.lock().delete(ContactId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(status) => status_response(status),
    }
}

/// Serve `api` on an ephemeral localhost port. Returns the base URL and the
/// server task; abort the task to stop serving.
pub async fn spawn_fake_server(api: FakeContactApi) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("failed to bind fake contacts server");
    let addr = listener.local_addr().expect("listener has a local address");
    let app = build_router(api);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("fake contacts server stopped: {e}");
        }
    });

    (format!("http://{addr}"), handle)
}
