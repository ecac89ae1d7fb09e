//! Index synchronization pipeline.
//!
//! One pass per source: fetch every record → map it to a search document →
//! submit the documents one at a time → report the tally.
//!
//! Failing to obtain the record set (unreachable source, bad response, or
//! an empty set) aborts the run. Anything that goes wrong for a single
//! record is logged with the document id, counted, and the loop moves on;
//! it never changes the exit status.

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::index_client::SearchIndexClient;
use crate::models::RunTally;
use crate::source_command::CommandSource;
use crate::source_http::HttpListSource;
use crate::traits::{DocumentSink, RecordSource};
use crate::transform::to_document;

/// Source names accepted by `gymsync sync`.
pub const SOURCE_NAMES: &[&str] = &["activities", "plans", "plans-store"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Fetch and transform only; nothing is submitted.
    pub dry_run: bool,
    /// Process at most this many fetched records.
    pub limit: Option<usize>,
}

/// Build the configured source for `name`.
pub fn build_source(config: &Config, name: &str) -> Result<Box<dyn RecordSource>> {
    let source: Box<dyn RecordSource> = match name {
        "activities" => Box::new(HttpListSource::activities(config)?),
        "plans" => Box::new(HttpListSource::plans(config)?),
        "plans-store" => Box::new(CommandSource::plans_store(config)),
        _ => bail!(
            "Unknown source: '{}'. Available: all, {}",
            name,
            SOURCE_NAMES.join(", ")
        ),
    };
    Ok(source)
}

/// Run `gymsync sync <target>` against the configured search index.
///
/// `all` syncs the activities and plans APIs in turn and stops at the
/// first fatal error.
pub async fn run_sync(config: &Config, target: &str, opts: SyncOptions) -> Result<RunTally> {
    let names: Vec<&str> = match target {
        "all" => vec!["activities", "plans"],
        other => vec![other],
    };

    let sink = SearchIndexClient::from_config(config)?;
    let mut total = RunTally::default();

    for name in names {
        let source = build_source(config, name)?;
        let tally = sync_source(source.as_ref(), &sink, opts).await?;
        print_summary(source.as_ref(), &tally, opts);
        total.absorb(tally);
    }

    Ok(total)
}

/// One fetch/transform/load pass of `source` into `sink`.
pub async fn sync_source(
    source: &dyn RecordSource,
    sink: &dyn DocumentSink,
    opts: SyncOptions,
) -> Result<RunTally> {
    let kind = source.kind();
    tracing::info!(source = source.name(), endpoint = %source.endpoint(), "fetching records");

    let mut records = source.list().await.with_context(|| {
        format!(
            "Failed to fetch {} records from {}",
            source.name(),
            source.endpoint()
        )
    })?;

    if records.is_empty() {
        bail!(
            "No {} records found at {}; nothing to synchronize",
            source.name(),
            source.endpoint()
        );
    }

    if let Some(lim) = opts.limit {
        if lim == 0 {
            bail!("--limit must be at least 1; nothing to synchronize");
        }
        records.truncate(lim);
    }

    tracing::info!(source = source.name(), count = records.len(), "records fetched");

    let mut tally = RunTally {
        fetched: records.len(),
        ..RunTally::default()
    };

    for (position, record) in records.iter().enumerate() {
        let document = match to_document(kind, record) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(source = source.name(), position, error = %e, "skipping record");
                tally.errors += 1;
                continue;
            }
        };

        if opts.dry_run {
            tracing::debug!(id = document.id(), "would index");
            continue;
        }

        match sink.submit(&document).await {
            Ok(()) => {
                tracing::info!(id = document.id(), name = document.label(), "indexed {}", kind);
                tally.indexed += 1;
            }
            Err(e) => {
                tracing::error!(id = document.id(), error = %e, "failed to index {}", kind);
                tally.errors += 1;
            }
        }
    }

    Ok(tally)
}

fn print_summary(source: &dyn RecordSource, tally: &RunTally, opts: SyncOptions) {
    if opts.dry_run {
        println!("sync {} (dry-run)", source.name());
        println!("  source: {}", source.endpoint());
        println!("  fetched: {}", tally.fetched);
        println!("  documents: {}", tally.fetched - tally.errors);
        println!("  transform errors: {}", tally.errors);
        return;
    }

    println!("sync {}", source.name());
    println!("  source: {}", source.endpoint());
    println!("  fetched: {}", tally.fetched);
    println!("  {}", tally);
    println!("ok");
}
