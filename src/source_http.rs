//! HTTP listing sources.
//!
//! Reads a resource collection from an upstream service. Two response
//! shapes are understood:
//!
//! - a bare JSON array (the activities API): one request, all records;
//! - a paginated envelope (the subscriptions API):
//!
//!   ```json
//!   { "plans": [ ... ], "total": 42, "page": 1, "page_size": 100, "total_pages": 1 }
//!   ```
//!
//!   Pages are requested with `?page=N&page_size=S` until `total_pages`
//!   is reached.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::index_client::{authorize, build_client};
use crate::models::{RecordKind, SourceRecord};
use crate::traits::RecordSource;

/// Upper bound on pages walked in one listing.
const MAX_PAGES: u32 = 10_000;

/// One decoded listing response.
#[derive(Debug)]
pub struct Page {
    pub records: Vec<SourceRecord>,
    pub total_pages: Option<u32>,
}

/// Decode a listing response into records.
///
/// `items_field` names the envelope array for paginated responses.
pub fn parse_page(value: Value, items_field: &str) -> Result<Page> {
    let (items, total_pages) = match value {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let total_pages = map
                .get("total_pages")
                .and_then(Value::as_u64)
                .map(|n| n.min(u32::MAX as u64) as u32);
            let items = match map.remove(items_field) {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => bail!("'{}' in listing response is not an array", items_field),
            };
            (items, total_pages)
        }
        other => bail!("listing response is not a JSON array or object: {}", other),
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            SourceRecord::from_value(item)
                .ok_or_else(|| anyhow!("listing item {} is not a JSON object", i))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        records,
        total_pages,
    })
}

/// [`RecordSource`] backed by a `GET` on a collection URL.
pub struct HttpListSource {
    name: String,
    kind: RecordKind,
    url: String,
    /// `Some` enables `page`/`page_size` query parameters.
    page_size: Option<u32>,
    items_field: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpListSource {
    pub fn new(
        name: impl Into<String>,
        kind: RecordKind,
        url: impl Into<String>,
        client: reqwest::Client,
        token: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
            page_size: None,
            items_field: "items".to_string(),
            client,
            token,
        }
    }

    pub fn paginated(mut self, page_size: u32, items_field: impl Into<String>) -> Self {
        self.page_size = Some(page_size);
        self.items_field = items_field.into();
        self
    }

    /// Activities API listing.
    pub fn activities(config: &Config) -> Result<Self> {
        Ok(Self::new(
            "activities",
            RecordKind::Activity,
            config.activities.list_url.clone(),
            build_client(config)?,
            config.bearer_token().map(str::to_string),
        ))
    }

    /// Subscriptions API plan listing.
    pub fn plans(config: &Config) -> Result<Self> {
        Ok(Self::new(
            "plans",
            RecordKind::Plan,
            config.plans.api_url.clone(),
            build_client(config)?,
            config.bearer_token().map(str::to_string),
        )
        .paginated(config.plans.page_size, config.plans.items_field.clone()))
    }

    async fn fetch(&self, page: u32) -> Result<Value> {
        let mut request = self.client.get(&self.url);
        if let Some(size) = self.page_size {
            request = request.query(&[("page", page), ("page_size", size)]);
        }
        let response = authorize(request, self.token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", self.url, status, body);
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Invalid JSON from {}", self.url))
    }
}

#[async_trait]
impl RecordSource for HttpListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn list(&self) -> Result<Vec<SourceRecord>> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let body = self.fetch(page).await?;
            let parsed = parse_page(body, &self.items_field)?;
            let received = parsed.records.len();
            records.extend(parsed.records);

            tracing::debug!(source = %self.name, page, received, "fetched listing page");

            let more = self.page_size.is_some()
                && received > 0
                && page < MAX_PAGES
                && parsed.total_pages.is_some_and(|total| page < total);
            if !more {
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}
