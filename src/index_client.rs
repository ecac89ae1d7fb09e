//! HTTP client for the search API's indexing endpoint.
//!
//! Every document is sent as its own `POST` with a JSON body. A `200` or
//! `201` counts as indexed; any other status, or a transport failure, is a
//! [`SubmitError`] the sync engine records against that document only.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::SearchDocument;
use crate::traits::DocumentSink;

/// Per-document submission failure.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request never produced a response (connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with something other than 200/201.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Build the shared HTTP client with the configured timeout.
pub fn build_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Attach the bearer token, if one is configured.
pub fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Accepted statuses for create/index calls.
pub fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

/// [`DocumentSink`] backed by `POST {search.index_url}`.
pub struct SearchIndexClient {
    client: reqwest::Client,
    index_url: String,
    token: Option<String>,
}

impl SearchIndexClient {
    pub fn new(client: reqwest::Client, index_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            index_url: index_url.into(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            build_client(config)?,
            config.search.index_url.clone(),
            config.bearer_token().map(str::to_string),
        ))
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }
}

#[async_trait]
impl DocumentSink for SearchIndexClient {
    async fn submit(&self, document: &SearchDocument) -> Result<(), SubmitError> {
        let request = authorize(self.client.post(&self.index_url), self.token.as_deref());
        let response = request.json(document).send().await?;

        let status = response.status();
        if is_accepted(status) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SubmitError::Status { status, body })
    }
}
