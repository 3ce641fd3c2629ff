//! Search session: rate limiting, parameter defaults, and status reporting.

use std::fmt;
use std::time::Instant;

use crate::error::ApiError;
use crate::rate_limit::{RateLimitUsage, SlidingWindowLimiter};
use crate::transport::SearchTransport;
use crate::types::SearchLocation;

/// Search inputs as entered by the user. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub postal_code: Option<String>,
    pub radius: Option<f64>,
    pub limit: Option<u32>,
    pub keyword: Option<String>,
}

/// Values used when the user leaves radius or limit empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchDefaults {
    pub radius: f64,
    pub limit: u32,
}

/// Fully-resolved query sent to the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub postal_code: Option<String>,
    pub radius: f64,
    pub limit: u32,
    pub keyword: Option<String>,
}

impl SearchParams {
    #[must_use]
    pub fn resolve(&self, defaults: SearchDefaults) -> SearchQuery {
        SearchQuery {
            postal_code: non_blank(self.postal_code.as_deref()),
            radius: self.radius.unwrap_or(defaults.radius),
            limit: self.limit.unwrap_or(defaults.limit),
            keyword: non_blank(self.keyword.as_deref()),
        }
    }
}

impl SearchQuery {
    /// Query-string pairs in the order the endpoint documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(code) = &self.postal_code {
            pairs.push(("postal_code", code.clone()));
        }
        pairs.push(("radius", self.radius.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        pairs
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Info => write!(f, "info"),
            StatusLevel::Success => write!(f, "success"),
            StatusLevel::Warning => write!(f, "warning"),
            StatusLevel::Error => write!(f, "error"),
        }
    }
}

/// Message shown to the user after every attempted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub status: StatusMessage,
    pub results: Vec<SearchLocation>,
    /// Whether a request actually went out (false when throttled locally).
    pub sent: bool,
}

/// Human-readable message for a failed search, one category per failure kind.
#[must_use]
pub fn describe_search_error(err: &ApiError) -> String {
    let detail = match err {
        ApiError::Timeout { .. } => "Request timed out.".to_string(),
        ApiError::Deserialize { .. } => "Error parsing response.".to_string(),
        ApiError::UnexpectedStatus { status, .. } => format!("HTTP {status}."),
        ApiError::RateLimited { wait_secs } => {
            format!("Rate limit exceeded. Please wait {wait_secs} seconds before trying again.")
        }
        ApiError::Http(e) if e.is_connect() => format!("Could not connect: {e}"),
        other => other.to_string(),
    };
    format!("Error performing search. {detail}")
}

/// A user's search session against one interface.
///
/// Searches take `&mut self`, so a session has at most one request in
/// flight. The request log lives with the session and is dropped with it.
pub struct SearchSession<T> {
    transport: T,
    item_id: String,
    defaults: SearchDefaults,
    limiter: SlidingWindowLimiter,
}

impl<T: SearchTransport> SearchSession<T> {
    pub fn new(
        transport: T,
        item_id: impl Into<String>,
        defaults: SearchDefaults,
        limiter: SlidingWindowLimiter,
    ) -> Self {
        Self {
            transport,
            item_id: item_id.into(),
            defaults,
            limiter,
        }
    }

    pub async fn search(&mut self, params: &SearchParams) -> SearchOutcome {
        self.search_at(params, Instant::now()).await
    }

    /// Run one search, checking the rate limit against `now`.
    pub async fn search_at(&mut self, params: &SearchParams, now: Instant) -> SearchOutcome {
        if let Err(err) = self.limiter.try_acquire_at(now) {
            return refused_outcome(&err);
        }

        let query = params.resolve(self.defaults);
        tracing::debug!(item_id = %self.item_id, ?query, "sending search request");

        match self.transport.search(&self.item_id, &query).await {
            Ok(response) if response.results.is_empty() => SearchOutcome {
                status: StatusMessage::new(StatusLevel::Warning, "No results found."),
                results: Vec::new(),
                sent: true,
            },
            Ok(response) => {
                let count = response.results.len();
                SearchOutcome {
                    status: StatusMessage::new(StatusLevel::Success, found_message(count, &query)),
                    results: response.results,
                    sent: true,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "search request failed");
                SearchOutcome {
                    status: StatusMessage::new(StatusLevel::Error, describe_search_error(&err)),
                    results: Vec::new(),
                    sent: true,
                }
            }
        }
    }

    /// Reset the form. The request log is kept.
    #[must_use]
    pub fn clear(&self) -> StatusMessage {
        StatusMessage::new(StatusLevel::Info, "Form cleared.")
    }

    #[must_use]
    pub fn rate_limit_usage(&mut self) -> RateLimitUsage {
        self.limiter.usage()
    }

    #[must_use]
    pub fn rate_limit_usage_at(&mut self, now: Instant) -> RateLimitUsage {
        self.limiter.usage_at(now)
    }
}

/// Outcome for a search the limiter refused; nothing was sent.
fn refused_outcome(err: &ApiError) -> SearchOutcome {
    let status = match err {
        ApiError::RateLimited { wait_secs } => {
            tracing::warn!(wait_secs, "search throttled locally");
            StatusMessage::new(
                StatusLevel::Warning,
                format!("Rate limit exceeded. Please wait {wait_secs} seconds before trying again."),
            )
        }
        other => StatusMessage::new(StatusLevel::Error, describe_search_error(other)),
    };
    SearchOutcome {
        status,
        results: Vec::new(),
        sent: false,
    }
}

fn found_message(count: usize, query: &SearchQuery) -> String {
    let plural = if count == 1 { "" } else { "s" };
    match &query.postal_code {
        Some(code) => format!(
            "Found {count} location{plural} within {} miles of {code}",
            query.radius
        ),
        None => format!("Found {count} location{plural} within {} miles", query.radius),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::types::SearchResponse;

    const DEFAULTS: SearchDefaults = SearchDefaults {
        radius: 25.0,
        limit: 20,
    };

    /// Replays scripted responses and records every query it receives.
    #[derive(Default)]
    struct ScriptedSearch {
        replies: Mutex<VecDeque<Result<SearchResponse, ApiError>>>,
        seen: Mutex<Vec<(String, SearchQuery)>>,
    }

    impl ScriptedSearch {
        fn replying(replies: Vec<Result<SearchResponse, ApiError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::default(),
            }
        }
    }

    impl SearchTransport for &ScriptedSearch {
        async fn search(
            &self,
            item_id: &str,
            query: &SearchQuery,
        ) -> Result<SearchResponse, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((item_id.to_string(), query.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SearchResponse::default()))
        }
    }

    fn locations(n: usize) -> SearchResponse {
        SearchResponse {
            results: (0..n)
                .map(|i| SearchLocation {
                    name: Some(format!("Store {i}")),
                    ..SearchLocation::default()
                })
                .collect(),
        }
    }

    #[test]
    fn resolve_applies_defaults_and_drops_blank_text() {
        let params = SearchParams {
            postal_code: Some("  ".to_string()),
            radius: None,
            limit: Some(5),
            keyword: Some(" coffee ".to_string()),
        };
        let query = params.resolve(DEFAULTS);
        assert_eq!(query.postal_code, None);
        assert!((query.radius - 25.0).abs() < f64::EPSILON);
        assert_eq!(query.limit, 5);
        assert_eq!(query.keyword.as_deref(), Some("coffee"));
    }

    #[test]
    fn query_pairs_include_radius_and_limit_always() {
        let query = SearchParams::default().resolve(DEFAULTS);
        assert_eq!(
            query.query_pairs(),
            vec![("radius", "25".to_string()), ("limit", "20".to_string())]
        );
    }

    #[test]
    fn query_pairs_follow_documented_order() {
        let query = SearchParams {
            postal_code: Some("29401".to_string()),
            radius: Some(10.5),
            limit: None,
            keyword: Some("tea".to_string()),
        }
        .resolve(DEFAULTS);
        let keys: Vec<_> = query.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["postal_code", "radius", "limit", "keyword"]);
        assert_eq!(query.query_pairs()[1].1, "10.5");
    }

    #[test]
    fn error_messages_are_distinct_per_category() {
        let timeout = describe_search_error(&ApiError::Timeout {
            url: "http://x".to_string(),
            timeout_secs: 10,
        });
        let parse = describe_search_error(&ApiError::Deserialize {
            context: "search".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        });
        let status = describe_search_error(&ApiError::UnexpectedStatus {
            status: 503,
            url: "http://x".to_string(),
        });
        assert_eq!(timeout, "Error performing search. Request timed out.");
        assert_eq!(parse, "Error performing search. Error parsing response.");
        assert_eq!(status, "Error performing search. HTTP 503.");
    }

    #[tokio::test]
    async fn successful_search_reports_count_and_radius() {
        let fake = ScriptedSearch::replying(vec![Ok(locations(2))]);
        let mut session = SearchSession::new(
            &fake,
            "77",
            DEFAULTS,
            SlidingWindowLimiter::per_minute(5),
        );
        let params = SearchParams {
            postal_code: Some("29401".to_string()),
            ..SearchParams::default()
        };

        let outcome = session.search(&params).await;

        assert!(outcome.sent);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.status.level, StatusLevel::Success);
        assert_eq!(
            outcome.status.text,
            "Found 2 locations within 25 miles of 29401"
        );
        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].0, "77");
    }

    #[tokio::test]
    async fn single_result_uses_singular_wording() {
        let fake = ScriptedSearch::replying(vec![Ok(locations(1))]);
        let mut session =
            SearchSession::new(&fake, "1", DEFAULTS, SlidingWindowLimiter::per_minute(5));
        let outcome = session.search(&SearchParams::default()).await;
        assert_eq!(outcome.status.text, "Found 1 location within 25 miles");
    }

    #[tokio::test]
    async fn empty_results_is_a_warning() {
        let fake = ScriptedSearch::replying(vec![Ok(SearchResponse::default())]);
        let mut session =
            SearchSession::new(&fake, "1", DEFAULTS, SlidingWindowLimiter::per_minute(5));
        let outcome = session.search(&SearchParams::default()).await;
        assert_eq!(outcome.status.level, StatusLevel::Warning);
        assert_eq!(outcome.status.text, "No results found.");
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn transport_error_is_reported_as_error_status() {
        let fake = ScriptedSearch::replying(vec![Err(ApiError::Timeout {
            url: "http://x".to_string(),
            timeout_secs: 10,
        })]);
        let mut session =
            SearchSession::new(&fake, "1", DEFAULTS, SlidingWindowLimiter::per_minute(5));
        let outcome = session.search(&SearchParams::default()).await;
        assert_eq!(outcome.status.level, StatusLevel::Error);
        assert_eq!(
            outcome.status.text,
            "Error performing search. Request timed out."
        );
    }

    #[tokio::test]
    async fn throttled_search_sends_nothing() {
        let fake = ScriptedSearch::default();
        let mut session =
            SearchSession::new(&fake, "1", DEFAULTS, SlidingWindowLimiter::per_minute(2));
        let start = Instant::now();

        session.search_at(&SearchParams::default(), start).await;
        session
            .search_at(&SearchParams::default(), start + Duration::from_secs(1))
            .await;
        let third = session
            .search_at(&SearchParams::default(), start + Duration::from_secs(30))
            .await;

        assert!(!third.sent);
        assert_eq!(third.status.level, StatusLevel::Warning);
        assert_eq!(
            third.status.text,
            "Rate limit exceeded. Please wait 30 seconds before trying again."
        );
        assert_eq!(fake.seen.lock().unwrap().len(), 2);

        let later = session
            .search_at(&SearchParams::default(), start + Duration::from_secs(61))
            .await;
        assert!(later.sent);
        assert_eq!(fake.seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn refused_outcome_reports_other_limiter_errors_as_errors() {
        let outcome = refused_outcome(&ApiError::UnexpectedStatus {
            status: 429,
            url: "http://x".to_string(),
        });
        assert!(!outcome.sent);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.status.level, StatusLevel::Error);
        assert_eq!(outcome.status.text, "Error performing search. HTTP 429.");
    }

    #[test]
    fn clear_reports_info_status() {
        let fake = ScriptedSearch::default();
        let session =
            SearchSession::new(&fake, "1", DEFAULTS, SlidingWindowLimiter::per_minute(2));
        assert_eq!(
            session.clear(),
            StatusMessage::new(StatusLevel::Info, "Form cleared.")
        );
    }
}
