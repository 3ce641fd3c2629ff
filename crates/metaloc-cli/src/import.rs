//! `import` command: read the CSV, upload it in batches, print progress.

use std::path::PathBuf;
use std::time::Duration;

use metaloc_api::MetalocatorClient;
use metaloc_core::AppConfig;
use metaloc_import::{
    effective_batch_size, partition, read_locations, run_import_with, BatchOutcome, BatchResult,
    ImportOptions, SkippedRow, MAX_BATCH_SIZE,
};

const RULE: &str = "==================================================";

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub(crate) struct ImportOverrides {
    pub(crate) csv: Option<PathBuf>,
    pub(crate) batch_size: Option<usize>,
    pub(crate) delay: Option<f64>,
}

/// Upload every location in the CSV.
///
/// Failed batches are reported and counted but do not make the command fail;
/// only problems before the first upload (unreadable CSV, bad options,
/// client construction) return an error.
pub(crate) async fn run_import(
    config: &AppConfig,
    overrides: &ImportOverrides,
    dry_run: bool,
) -> anyhow::Result<()> {
    let options = resolve_options(config, overrides)?;
    let csv_path = overrides
        .csv
        .clone()
        .unwrap_or_else(|| config.csv_path.clone());

    println!();
    println!("MetaLocator Bulk Import");
    println!("{RULE}");
    println!();

    println!("Reading CSV file: {}", csv_path.display());
    let load = read_locations(&csv_path)?;
    for skipped in &load.skipped {
        println!("{}", skipped_row_line(skipped));
    }

    if options.batch_size > MAX_BATCH_SIZE {
        tracing::warn!(
            configured = options.batch_size,
            max = MAX_BATCH_SIZE,
            "batch size exceeds the API maximum; capping"
        );
    }
    let batch_size = effective_batch_size(options.batch_size);
    let batches = partition(&load.records, batch_size);

    println!("Found {} locations to import", load.records.len());
    println!(
        "Splitting into {} batch(es) of up to {batch_size} records each",
        batches.len()
    );

    if dry_run {
        let mut first = 1;
        for (i, batch) in batches.iter().enumerate() {
            let last = first + batch.len() - 1;
            println!(
                "dry-run: [{}/{}] would send records {first}-{last}",
                i + 1,
                batches.len()
            );
            first = last + 1;
        }
        return Ok(());
    }

    let client = MetalocatorClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build MetaLocator client: {e}"))?;

    let report = run_import_with(&client, &load.records, options, |outcome| {
        for line in outcome_lines(outcome) {
            println!("{line}");
        }
    })
    .await;

    println!();
    println!("{}", report.stats);
    if report.stats.unaccounted() > 0 {
        println!(
            "Note: {} record(s) were not confirmed by the API and are counted in neither total.",
            report.stats.unaccounted()
        );
    }
    println!();

    Ok(())
}

fn resolve_options(config: &AppConfig, overrides: &ImportOverrides) -> anyhow::Result<ImportOptions> {
    let mut options = ImportOptions::from_config(config);
    if let Some(batch_size) = overrides.batch_size {
        anyhow::ensure!(batch_size >= 1, "--batch-size must be at least 1");
        options.batch_size = batch_size;
    }
    if let Some(delay) = overrides.delay {
        options.inter_batch_delay = Duration::try_from_secs_f64(delay)
            .map_err(|e| anyhow::anyhow!("invalid --delay {delay}: {e}"))?;
    }
    Ok(options)
}

fn skipped_row_line(row: &SkippedRow) -> String {
    format!(
        "Warning: Row {} has mismatched column count ({} of {}). Skipping.",
        row.line, row.found, row.expected
    )
}

/// Operator-facing lines for one finished batch.
fn outcome_lines(outcome: &BatchOutcome) -> Vec<String> {
    let tag = format!("[{}/{}]", outcome.number, outcome.total_batches);
    let mut lines = Vec::new();

    match &outcome.result {
        BatchResult::Accepted(accepted) => {
            match accepted.reported_results {
                Some(_) => lines.push(format!(
                    "{tag} \u{2713} Success: {} record(s) imported",
                    accepted.succeeded
                )),
                None if accepted.succeeded > 0 => {
                    lines.push(format!("{tag} \u{2713} Success: Batch imported"));
                }
                None => lines.push(format!(
                    "{tag} ? Unconfirmed: response had no results list"
                )),
            }
            if accepted.failed > 0 {
                lines.push(format!(
                    "  {} record(s) missing from results, counted as failed",
                    accepted.failed
                ));
            }
            if accepted.unaccounted > 0 {
                lines.push(format!(
                    "  {} record(s) not confirmed by the response",
                    accepted.unaccounted
                ));
            }
            for warning in &accepted.warnings {
                lines.push(format!("  Warning: {}", warning.message));
                if let Some(line) = &warning.line_number {
                    lines.push(format!("    Line: {line}"));
                }
            }
        }
        BatchResult::Failed(failure) => {
            lines.push(format!("{tag} \u{2717} Failed: Batch import failed"));
            lines.push(format!(
                "  HTTP Code: {}",
                failure
                    .status
                    .map_or_else(|| "none".to_string(), |s| s.to_string())
            ));
            lines.push(format!("  Error: {}", failure.error));
            if let Some(excerpt) = failure.body_excerpt.as_deref().filter(|e| !e.is_empty()) {
                lines.push(format!("  Response: {excerpt}..."));
            }
        }
    }

    lines
}
