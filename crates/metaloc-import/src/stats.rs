//! Running totals for an import.

use std::fmt;

use crate::outcome::BatchOutcome;

const RULE: &str = "==================================================";

/// Aggregate counts for one import run.
///
/// `total` is fixed when the run starts; `success` and `failed` only grow,
/// through [`ImportStats::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportStats {
    total: usize,
    success: usize,
    failed: usize,
}

impl ImportStats {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            success: 0,
            failed: 0,
        }
    }

    /// Fold one batch outcome into the totals.
    #[must_use]
    pub fn apply(self, outcome: &BatchOutcome) -> Self {
        Self {
            total: self.total,
            success: self.success + outcome.succeeded(),
            failed: self.failed + outcome.failed(),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn success(&self) -> usize {
        self.success
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Records counted in neither `success` nor `failed`.
    #[must_use]
    pub fn unaccounted(&self) -> usize {
        self.total.saturating_sub(self.success + self.failed)
    }

    /// `success / total * 100`, rounded to two decimals; `0.0` for an empty run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = self.success as f64 / self.total as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Import Summary")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total Locations: {}", self.total)?;
        writeln!(f, "Successful: {}", self.success)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Success Rate: {}%", self.success_rate())?;
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Accepted, BatchResult, Failure};

    fn accepted(first: usize, last: usize, succeeded: usize) -> BatchOutcome {
        BatchOutcome {
            number: 1,
            total_batches: 1,
            first_record: first,
            last_record: last,
            result: BatchResult::Accepted(Accepted {
                succeeded,
                failed: 0,
                unaccounted: last + 1 - first - succeeded,
                reported_results: Some(succeeded),
                warnings: Vec::new(),
                body: serde_json::Value::Null,
            }),
        }
    }

    fn failed(first: usize, last: usize) -> BatchOutcome {
        BatchOutcome {
            number: 2,
            total_batches: 2,
            first_record: first,
            last_record: last,
            result: BatchResult::Failed(Failure {
                status: Some(500),
                error: "HTTP 500".to_string(),
                body_excerpt: None,
            }),
        }
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let stats = ImportStats::new(0);
        assert!(stats.success_rate().abs() < f64::EPSILON);
        assert_eq!(stats.unaccounted(), 0);
    }

    #[test]
    fn apply_adds_successes_and_failures() {
        let stats = ImportStats::new(10)
            .apply(&accepted(1, 5, 5))
            .apply(&failed(6, 10));
        assert_eq!(stats.success(), 5);
        assert_eq!(stats.failed(), 5);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_rounds_to_two_decimals() {
        let stats = ImportStats::new(3).apply(&accepted(1, 3, 1));
        assert!((stats.success_rate() - 33.33).abs() < 1e-9);
        assert_eq!(stats.unaccounted(), 2);
    }

    #[test]
    fn summary_block_lists_counts() {
        let stats = ImportStats::new(4).apply(&accepted(1, 4, 4));
        let summary = stats.to_string();
        assert!(summary.starts_with(RULE));
        assert!(summary.contains("Import Summary"));
        assert!(summary.contains("Total Locations: 4"));
        assert!(summary.contains("Successful: 4"));
        assert!(summary.contains("Failed: 0"));
        assert!(summary.contains("Success Rate: 100%"));
    }
}
