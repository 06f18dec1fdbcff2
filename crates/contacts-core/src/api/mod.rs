//! The remote contacts API.
//!
//! [`ContactApi`] is the seam between the manager and the network. The
//! production implementation is [`HttpContactApi`]; tests substitute an
//! in-memory fake.

mod http;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::contact::{Contact, ContactId, FieldMap};

pub use http::{ApiConfig, HttpContactApi};

/// The four calls the client makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// The only status each operation treats as success.
    ///
    /// Updates answer `201 Created`, not 200/204.
    pub fn expected_status(self) -> u16 {
        match self {
            Self::List => 200,
            Self::Create | Self::Update => 201,
            Self::Delete => 204,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} failed: server answered {status} (expected {expected})", expected = .operation.expected_status())]
    UnexpectedStatus {
        operation: Operation,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Contact CRUD against the remote store.
///
/// Every method resolves to `Ok` only on the operation's expected status.
#[async_trait]
pub trait ContactApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Contact>, ApiError>;

    async fn create(&self, fields: &FieldMap) -> Result<Contact, ApiError>;

    async fn update(&self, id: ContactId, fields: &FieldMap) -> Result<Contact, ApiError>;

    async fn delete(&self, id: ContactId) -> Result<(), ApiError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ContactApi) {}
};

#[async_trait]
impl<T: ContactApi + ?Sized> ContactApi for Box<T> {
    async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        (**self).list().await
    }

    async fn create(&self, fields: &FieldMap) -> Result<Contact, ApiError> {
        (**self).create(fields).await
    }

    async fn update(&self, id: ContactId, fields: &FieldMap) -> Result<Contact, ApiError> {
        (**self).update(id, fields).await
    }

    async fn delete(&self, id: ContactId) -> Result<(), ApiError> {
        (**self).delete(id).await
    }
}
