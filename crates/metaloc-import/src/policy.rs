//! How a 2xx bulk response is turned into success/failure counts.
//!
//! The bulk endpoint may or may not send a per-record `results` list, and its
//! length is not guaranteed to match the batch. Neither case is documented,
//! so both are explicit, overridable policies. By default no list means the
//! whole batch was taken, and a short list counts only what it reports.

use metaloc_core::AppConfig;

/// What to do when a 2xx body has no `results` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingResults {
    /// Trust the status code and count the whole batch as imported.
    ///
    /// This is an assumption about an API we do not control, not a guarantee.
    #[default]
    AssumeSuccess,
    /// Count nothing; the batch is reported as unaccounted.
    Unaccounted,
}

/// What to do when `results` is shorter than the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortResults {
    /// Count the reported results as successes and leave the rest out of
    /// both totals.
    #[default]
    Unaccounted,
    /// Count the shortfall as failed.
    CountAsFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountingPolicy {
    pub missing_results: MissingResults,
    pub short_results: ShortResults,
}

/// Per-batch split produced by [`AccountingPolicy::account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
    pub unaccounted: usize,
}

impl AccountingPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            missing_results: if config.assume_success_without_results {
                MissingResults::AssumeSuccess
            } else {
                MissingResults::Unaccounted
            },
            short_results: if config.count_shortfall_as_failed {
                ShortResults::CountAsFailed
            } else {
                ShortResults::Unaccounted
            },
        }
    }

    /// Split a batch of `batch_len` records given the reported `results` length.
    ///
    /// A list longer than the batch is clamped so the tally never exceeds it.
    #[must_use]
    pub fn account(self, reported: Option<usize>, batch_len: usize) -> Tally {
        match reported {
            None => match self.missing_results {
                MissingResults::AssumeSuccess => Tally {
                    succeeded: batch_len,
                    failed: 0,
                    unaccounted: 0,
                },
                MissingResults::Unaccounted => Tally {
                    succeeded: 0,
                    failed: 0,
                    unaccounted: batch_len,
                },
            },
            Some(count) => {
                let succeeded = count.min(batch_len);
                let shortfall = batch_len - succeeded;
                match self.short_results {
                    ShortResults::Unaccounted => Tally {
                        succeeded,
                        failed: 0,
                        unaccounted: shortfall,
                    },
                    ShortResults::CountAsFailed => Tally {
                        succeeded,
                        failed: shortfall,
                        unaccounted: 0,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_assumes_success_without_results() {
        let tally = AccountingPolicy::default().account(None, 50);
        assert_eq!(
            tally,
            Tally {
                succeeded: 50,
                failed: 0,
                unaccounted: 0
            }
        );
    }

    #[test]
    fn unaccounted_policy_counts_nothing_without_results() {
        let policy = AccountingPolicy {
            missing_results: MissingResults::Unaccounted,
            ..AccountingPolicy::default()
        };
        assert_eq!(policy.account(None, 10).unaccounted, 10);
        assert_eq!(policy.account(None, 10).succeeded, 0);
    }

    #[test]
    fn reported_results_count_exactly() {
        let tally = AccountingPolicy::default().account(Some(7), 7);
        assert_eq!(tally.succeeded, 7);
        assert_eq!(tally.unaccounted, 0);
    }

    #[test]
    fn short_results_default_to_unaccounted() {
        let tally = AccountingPolicy::default().account(Some(3), 10);
        assert_eq!(
            tally,
            Tally {
                succeeded: 3,
                failed: 0,
                unaccounted: 7
            }
        );
    }

    #[test]
    fn short_results_can_count_as_failed() {
        let policy = AccountingPolicy {
            short_results: ShortResults::CountAsFailed,
            ..AccountingPolicy::default()
        };
        let tally = policy.account(Some(3), 10);
        assert_eq!(tally.succeeded, 3);
        assert_eq!(tally.failed, 7);
    }

    #[test]
    fn long_results_are_clamped_to_batch() {
        let tally = AccountingPolicy::default().account(Some(12), 10);
        assert_eq!(tally.succeeded, 10);
        assert_eq!(tally.unaccounted, 0);
    }
}
