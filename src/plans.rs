//! Plan catalog seeding.
//!
//! Creates each catalog plan through the subscriptions API and then indexes
//! the plans the API returned (which carry the identifiers it assigned).
//! A plan the API rejects is logged and counted; the remaining plans are
//! still created and indexed.
//!
//! `seed plans --store` bypasses the API and replaces the document-store
//! collection with the catalog through the configured command. Those plans
//! reach the index with `sync plans-store`.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::config::{Config, PLANS_PLACEHOLDER};
use crate::index_client::{authorize, build_client, is_accepted, SearchIndexClient};
use crate::models::{PlanDefinition, RecordKind, SourceRecord};
use crate::source_command::run_command;
use crate::sync::{sync_source, SyncOptions};
use crate::traits::{DocumentSink, StaticSource};

/// Outcome of a `seed plans` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedTally {
    pub created: usize,
    pub indexed: usize,
    /// Creation failures plus indexing failures.
    pub errors: usize,
}

/// Client for `POST {plans.api_url}`.
pub struct PlanApiClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl PlanApiClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            build_client(config)?,
            config.plans.api_url.clone(),
            config.bearer_token().map(str::to_string),
        ))
    }

    /// Create one plan; returns the created plan as the API echoes it.
    pub async fn create(&self, plan: &PlanDefinition) -> Result<SourceRecord> {
        let request = authorize(self.client.post(&self.url), self.token.as_deref());
        let response = request.json(plan).send().await?;

        let status = response.status();
        if !is_accepted(status) {
            let body = response.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", self.url, status, body);
        }

        let created: Value = response.json().await?;
        match SourceRecord::from_value(created) {
            Some(record) => Ok(record),
            None => bail!("{} returned a non-object plan", self.url),
        }
    }
}

/// Create every plan in `catalog`, then index the created plans into `sink`.
pub async fn seed_plans(
    api: &PlanApiClient,
    sink: &dyn DocumentSink,
    catalog: &[PlanDefinition],
) -> Result<SeedTally> {
    let mut tally = SeedTally::default();
    let mut created = Vec::with_capacity(catalog.len());

    for plan in catalog {
        match api.create(plan).await {
            Ok(record) => {
                let id = match record.get("id") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "N/A".to_string(),
                };
                tracing::info!(name = %plan.nombre, id = %id, "plan created");
                created.push(record);
            }
            Err(e) => {
                tracing::error!(name = %plan.nombre, error = %e, "failed to create plan");
                tally.errors += 1;
            }
        }
    }

    tally.created = created.len();
    if created.is_empty() {
        bail!(
            "No plans were created ({} failed); nothing to index",
            tally.errors
        );
    }

    let source = StaticSource::new("created plans", RecordKind::Plan, created);
    let indexed = sync_source(&source, sink, SyncOptions::default()).await?;
    tally.indexed = indexed.indexed;
    tally.errors += indexed.errors;

    Ok(tally)
}

/// Run `gymsync seed plans` with the configured catalog.
pub async fn run_seed_plans(config: &Config) -> Result<SeedTally> {
    let api = PlanApiClient::from_config(config)?;
    let sink = SearchIndexClient::from_config(config)?;

    let tally = seed_plans(&api, &sink, &config.catalog).await?;

    println!("seed plans");
    println!("  api: {}", config.plans.api_url);
    println!("  index: {}", sink.index_url());
    println!(
        "  Created: {}, Indexed: {}, Errors: {}",
        tally.created, tally.indexed, tally.errors
    );
    println!("ok");

    Ok(tally)
}

/// Replace the document-store plan collection with `catalog`.
///
/// Every `{plans}` in `argv` becomes the catalog as a JSON array. Returns
/// the number of plans handed to the command.
pub async fn seed_plan_store(argv: &[String], catalog: &[PlanDefinition]) -> Result<usize> {
    if catalog.is_empty() {
        bail!("The plan catalog is empty; nothing to store");
    }

    let plans = serde_json::to_string(catalog)?;
    let argv: Vec<String> = argv
        .iter()
        .map(|arg| arg.replace(PLANS_PLACEHOLDER, &plans))
        .collect();

    let program = argv.first().map(String::as_str).unwrap_or_default();
    tracing::info!(command = program, plans = catalog.len(), "replacing stored plans");

    let stdout = run_command(&argv)
        .await
        .context("Failed to seed plans into the document store")?;
    tracing::debug!(output = %stdout.trim(), "seed command finished");

    Ok(catalog.len())
}

/// Run `gymsync seed plans --store`.
pub async fn run_seed_plan_store(config: &Config) -> Result<usize> {
    let stored = seed_plan_store(&config.plans.store.seed, &config.catalog).await?;

    println!("seed plans (store)");
    println!("  Stored: {}", stored);
    println!("  index with: gymsync sync plans-store");
    println!("ok");

    Ok(stored)
}
