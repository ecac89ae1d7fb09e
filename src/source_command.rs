//! Document-store source driven by external commands.
//!
//! The plan collection lives in a document store that is only reachable
//! through its shell inside the container (`docker exec gym-mongo mongosh
//! ...`). The source runs an optional *prepare* command first (copying the
//! `plans` collection into `planes`, which is what the API reads), then an
//! *export* command that prints the collection as a JSON array.
//!
//! A failing prepare step is logged as a warning; a failing export is fatal.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::config::Config;
use crate::models::{RecordKind, SourceRecord};
use crate::traits::RecordSource;

pub struct CommandSource {
    name: String,
    kind: RecordKind,
    prepare: Option<Vec<String>>,
    export: Vec<String>,
}

impl CommandSource {
    pub fn new(
        name: impl Into<String>,
        kind: RecordKind,
        prepare: Option<Vec<String>>,
        export: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            // An empty prepare list disables the step
            prepare: prepare.filter(|argv| !argv.is_empty()),
            export,
        }
    }

    pub fn plans_store(config: &Config) -> Self {
        Self::new(
            "plans-store",
            RecordKind::Plan,
            config.plans.store.prepare.clone(),
            config.plans.store.export.clone(),
        )
    }

    async fn prepare(&self) {
        let Some(argv) = &self.prepare else {
            return;
        };
        match run_command(argv).await {
            Ok(stdout) => {
                tracing::info!(source = %self.name, output = %stdout.trim(), "prepare step finished")
            }
            Err(e) => {
                tracing::warn!(source = %self.name, error = ?e, "prepare step failed, continuing")
            }
        }
    }
}

#[async_trait]
impl RecordSource for CommandSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn endpoint(&self) -> String {
        self.export.join(" ")
    }

    async fn list(&self) -> Result<Vec<SourceRecord>> {
        self.prepare().await;

        let stdout = run_command(&self.export).await?;
        parse_export(&stdout)
    }
}

/// Decode the export command's stdout: a JSON array of objects.
pub fn parse_export(stdout: &str) -> Result<Vec<SourceRecord>> {
    let value: Value =
        serde_json::from_str(stdout.trim()).context("export output is not valid JSON")?;

    let Value::Array(items) = value else {
        bail!("export output is not a JSON array");
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            SourceRecord::from_value(item)
                .ok_or_else(|| anyhow!("export item {} is not a JSON object", i))
        })
        .collect()
}

/// Run `argv`, returning stdout. Non-zero exit is an error carrying stderr.
pub(crate) async fn run_command(argv: &[String]) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("empty command"))?;

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to run '{}'", program))?;

    if !output.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    String::from_utf8(output.stdout).with_context(|| format!("'{}' printed non-UTF-8 output", program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_extended_json() {
        let records = parse_export(
            r#"
            [{"_id":{"$oid":"507f1f77bcf86cd799439011"},"nombre":"Plan Básico","precio_mensual":15000}]
            "#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("nombre").unwrap(), "Plan Básico");
    }

    #[test]
    fn test_parse_export_rejects_garbage() {
        assert!(parse_export("MongoServerError: not authorized").is_err());
        assert!(parse_export(r#"{"_id":"x"}"#).is_err());
        assert!(parse_export("[1]").is_err());
    }

    #[test]
    fn test_empty_prepare_is_disabled() {
        let source = CommandSource::new("s", RecordKind::Plan, Some(vec![]), vec!["true".into()]);
        assert!(source.prepare.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_runs_export_command() {
        let source = CommandSource::new(
            "plans-store",
            RecordKind::Plan,
            Some(vec!["false".to_string()]),
            vec![
                "echo".to_string(),
                r#"[{"_id":"a1","nombre":"Plan Premium"}]"#.to_string(),
            ],
        );
        let records = source.list().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_export_is_fatal() {
        let source = CommandSource::new("plans-store", RecordKind::Plan, None, vec!["false".to_string()]);
        assert!(source.list().await.is_err());
    }
}
