pub mod client;
pub mod error;
pub mod rate_limit;
pub mod render;
pub mod search;
pub mod transport;
pub mod types;

pub use client::MetalocatorClient;
pub use error::ApiError;
pub use rate_limit::{RateLimitUsage, SlidingWindowLimiter, SEARCH_WINDOW};
pub use search::{
    describe_search_error, SearchDefaults, SearchOutcome, SearchParams, SearchQuery,
    SearchSession, StatusLevel, StatusMessage,
};
pub use transport::{BulkTransport, SearchTransport};
pub use types::{BulkLogEntry, BulkResponse, RawResponse, SearchLocation, SearchResponse};
