//! Splitting the record list into upload batches.

use metaloc_core::LocationRecord;

/// Most records the bulk endpoint accepts in one request.
pub const MAX_BATCH_SIZE: usize = 200;

/// The configured batch size clamped to `1..=MAX_BATCH_SIZE`.
#[must_use]
pub fn effective_batch_size(configured: usize) -> usize {
    configured.clamp(1, MAX_BATCH_SIZE)
}

/// Consecutive, order-preserving batches of at most
/// [`effective_batch_size`]`(batch_size)` records. Empty input yields none.
#[must_use]
pub fn partition(records: &[LocationRecord], batch_size: usize) -> Vec<&[LocationRecord]> {
    records.chunks(effective_batch_size(batch_size)).collect()
}
