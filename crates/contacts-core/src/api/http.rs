//! [`ContactApi`] over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, ContactApi, Operation};
use crate::contact::{Contact, ContactId, FieldMap};

/// Connection settings for [`HttpContactApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3000";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Clone)]
pub struct HttpContactApi {
    client: Client,
    base_url: String,
}

impl HttpContactApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/contacts", self.base_url)
    }

    fn contact_url(&self, id: ContactId) -> String {
        format!("{}/api/contacts/{id}", self.base_url)
    }
}

/// Fail with [`ApiError::UnexpectedStatus`] unless `response` carries the
/// operation's expected status.
async fn expect_status(operation: Operation, response: Response) -> Result<Response, ApiError> {
    let status = response.status().as_u16();
    if status == operation.expected_status() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%operation, status, "unexpected status from contacts API");
    Err(ApiError::UnexpectedStatus {
        operation,
        status,
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ContactApi for HttpContactApi {
    async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET contacts");
        let response = self.client.get(&url).send().await?;
        let response = expect_status(Operation::List, response).await?;
        decode(response).await
    }

    async fn create(&self, fields: &FieldMap) -> Result<Contact, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, "POST contact");
        let response = self.client.post(&url).json(fields).send().await?;
        let response = expect_status(Operation::Create, response).await?;
        decode(response).await
    }

    async fn update(&self, id: ContactId, fields: &FieldMap) -> Result<Contact, ApiError> {
        let url = self.contact_url(id);
        tracing::debug!(%url, "PUT contact");
        let response = self.client.put(&url).json(fields).send().await?;
        let response = expect_status(Operation::Update, response).await?;
        decode(response).await
    }

    async fn delete(&self, id: ContactId) -> Result<(), ApiError> {
        let url = self.contact_url(id);
        tracing::debug!(%url, "DELETE contact");
        let response = self.client.delete(&url).send().await?;
        expect_status(Operation::Delete, response).await?;
        Ok(())
    }
}
