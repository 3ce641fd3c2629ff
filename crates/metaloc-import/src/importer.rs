//! Sequential batch upload with per-batch accounting.
//!
//! Batches go out one at a time, each awaited before the next, with a fixed
//! pause between them. Nothing a single batch does can abort the run: every
//! transport error, bad status, or unreadable body becomes a failed
//! [`BatchOutcome`] and the loop moves on.

use std::time::Duration;

use metaloc_api::{ApiError, BulkResponse, BulkTransport, RawResponse};
use metaloc_core::{AppConfig, LocationRecord};

use crate::batch::{effective_batch_size, partition};
use crate::outcome::{Accepted, BatchOutcome, BatchResult, Failure};
use crate::policy::AccountingPolicy;
use crate::stats::ImportStats;

/// Characters of a failed response body kept for operator output.
pub const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub inter_batch_delay: Duration,
    pub policy: AccountingPolicy,
}

impl ImportOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            inter_batch_delay: config.rate_limit_delay,
            policy: AccountingPolicy::from_config(config),
        }
    }
}

/// Final totals plus every batch outcome, in upload order.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub stats: ImportStats,
    pub batches: Vec<BatchOutcome>,
}

/// Turn one bulk exchange into a batch result.
#[must_use]
pub fn classify_response(
    response: Result<RawResponse, ApiError>,
    batch_len: usize,
    policy: AccountingPolicy,
) -> BatchResult {
    let raw = match response {
        Ok(raw) => raw,
        Err(e) => {
            return BatchResult::Failed(Failure {
                status: e.status(),
                error: e.to_string(),
                body_excerpt: None,
            })
        }
    };

    if !raw.is_success() {
        return BatchResult::Failed(Failure {
            status: Some(raw.status),
            error: format!("HTTP {}", raw.status),
            body_excerpt: Some(raw.body_excerpt(BODY_EXCERPT_CHARS)),
        });
    }

    let parsed = match BulkResponse::parse(&raw.body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return BatchResult::Failed(Failure {
                status: Some(raw.status),
                error: format!("unparsable response body: {e}"),
                body_excerpt: Some(raw.body_excerpt(BODY_EXCERPT_CHARS)),
            })
        }
    };

    let tally = policy.account(parsed.results, batch_len);
    BatchResult::Accepted(Accepted {
        succeeded: tally.succeeded,
        failed: tally.failed,
        unaccounted: tally.unaccounted,
        reported_results: parsed.results,
        warnings: parsed.log,
        body: parsed.body,
    })
}

/// Upload `records` and return the aggregate report.
pub async fn run_import<T: BulkTransport>(
    transport: &T,
    records: &[LocationRecord],
    options: ImportOptions,
) -> ImportReport {
    run_import_with(transport, records, options, |_| {}).await
}

/// Like [`run_import`], calling `on_batch` as soon as each batch is classified.
pub async fn run_import_with<T, F>(
    transport: &T,
    records: &[LocationRecord],
    options: ImportOptions,
    mut on_batch: F,
) -> ImportReport
where
    T: BulkTransport,
    F: FnMut(&BatchOutcome),
{
    let batch_size = effective_batch_size(options.batch_size);
    let batches = partition(records, batch_size);
    let total_batches = batches.len();

    tracing::info!(
        records = records.len(),
        batches = total_batches,
        batch_size,
        "starting bulk import"
    );

    let mut stats = ImportStats::new(records.len());
    let mut outcomes = Vec::with_capacity(total_batches);

    for (index, batch) in batches.into_iter().enumerate() {
        let number = index + 1;
        let first_record = index * batch_size + 1;
        let last_record = first_record + batch.len() - 1;

        let response = transport.post_bulk(batch).await;
        let result = classify_response(response, batch.len(), options.policy);

        match &result {
            BatchResult::Accepted(accepted) => {
                tracing::debug!(
                    batch = number,
                    records = batch.len(),
                    succeeded = accepted.succeeded,
                    unaccounted = accepted.unaccounted,
                    response = %accepted.body,
                    "batch accepted"
                );
            }
            BatchResult::Failed(failure) => {
                tracing::warn!(
                    batch = number,
                    records = batch.len(),
                    status = ?failure.status,
                    error = %failure.error,
                    "batch failed"
                );
            }
        }

        let outcome = BatchOutcome {
            number,
            total_batches,
            first_record,
            last_record,
            result,
        };
        stats = stats.apply(&outcome);
        on_batch(&outcome);
        outcomes.push(outcome);

        if number < total_batches && !options.inter_batch_delay.is_zero() {
            tracing::debug!(
                delay_secs = options.inter_batch_delay.as_secs_f64(),
                "waiting before next batch"
            );
            tokio::time::sleep(options.inter_batch_delay).await;
        }
    }

    tracing::info!(
        total = stats.total(),
        success = stats.success(),
        failed = stats.failed(),
        "bulk import finished"
    );

    ImportReport {
        stats,
        batches: outcomes,
    }
}
