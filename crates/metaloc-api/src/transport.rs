//! Seams between the request/accounting logic and the network.
//!
//! [`crate::MetalocatorClient`] implements both traits for real HTTP; tests
//! substitute scripted fakes so batching and rate limiting can be exercised
//! without a live endpoint.

use std::future::Future;

use metaloc_core::LocationRecord;

use crate::error::ApiError;
use crate::search::SearchQuery;
use crate::types::{RawResponse, SearchResponse};

/// Uploads one batch of records to the bulk endpoint.
///
/// Implementations return `Ok` for any response the server sent, whatever
/// its status; only failures to complete the exchange are `Err`.
pub trait BulkTransport {
    fn post_bulk(
        &self,
        records: &[LocationRecord],
    ) -> impl Future<Output = Result<RawResponse, ApiError>> + Send;
}

/// Runs one search against a configured interface.
pub trait SearchTransport {
    fn search(
        &self,
        item_id: &str,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<SearchResponse, ApiError>> + Send;
}
