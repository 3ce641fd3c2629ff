//! Per-batch results reported by the importer.

use metaloc_api::BulkLogEntry;
use serde_json::Value;

/// What happened to one batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// 1-based batch number.
    pub number: usize,
    pub total_batches: usize,
    /// 1-based index of the batch's first record in the import.
    pub first_record: usize,
    /// 1-based index of the batch's last record, inclusive.
    pub last_record: usize,
    pub result: BatchResult,
}

impl BatchOutcome {
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.last_record + 1 - self.first_record
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        match &self.result {
            BatchResult::Accepted(accepted) => accepted.succeeded,
            BatchResult::Failed(_) => 0,
        }
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        match &self.result {
            BatchResult::Accepted(accepted) => accepted.failed,
            BatchResult::Failed(_) => self.record_count(),
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.result, BatchResult::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub enum BatchResult {
    /// The server answered 2xx with a usable body.
    Accepted(Accepted),
    /// Transport error, non-2xx status, or an unparsable 2xx body.
    Failed(Failure),
}

#[derive(Debug, Clone)]
pub struct Accepted {
    pub succeeded: usize,
    pub failed: usize,
    /// Records counted in neither total under the accounting policy.
    pub unaccounted: usize,
    /// Length of the `results` list, if the body had one.
    pub reported_results: Option<usize>,
    pub warnings: Vec<BulkLogEntry>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: Option<u16>,
    pub error: String,
    pub body_excerpt: Option<String>,
}
