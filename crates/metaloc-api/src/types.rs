//! Response shapes for the bulk and search endpoints.
//!
//! The remote API is not under our control, so both parsers walk a
//! [`serde_json::Value`] and tolerate missing or oddly-typed fields rather
//! than failing the whole response.

use serde_json::Value;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The first `max_chars` characters of the body, for operator output.
    #[must_use]
    pub fn body_excerpt(&self, max_chars: usize) -> String {
        self.body.chars().take(max_chars).collect()
    }
}

/// A categorized warning from the bulk endpoint's `log` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLogEntry {
    pub category: String,
    pub message: String,
    pub line_number: Option<String>,
}

/// Parsed body of a 2xx bulk response.
#[derive(Debug, Clone, Default)]
pub struct BulkResponse {
    /// Length of the `results` list, or `None` when the body had no such list.
    pub results: Option<usize>,
    pub log: Vec<BulkLogEntry>,
    /// The parsed body, kept for debug output.
    pub body: Value,
}

impl BulkResponse {
    /// Parse a bulk response body.
    ///
    /// An empty body parses to a response with no `results` list.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if a non-empty body is not valid JSON.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(value))
    }

    #[must_use]
    pub fn from_value(body: Value) -> Self {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::len);
        let log = body.get("log").map(parse_log).unwrap_or_default();
        Self { results, log, body }
    }
}

/// `log` is normally `{category: [entries]}`, but an empty map may arrive
/// encoded as `[]`, and some servers send a flat list of entries.
fn parse_log(log: &Value) -> Vec<BulkLogEntry> {
    match log {
        Value::Object(categories) => categories
            .iter()
            .flat_map(|(category, entries)| {
                entries
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(move |entry| log_entry(category, entry))
            })
            .collect(),
        Value::Array(entries) => entries.iter().map(|e| log_entry("general", e)).collect(),
        _ => Vec::new(),
    }
}

fn log_entry(category: &str, entry: &Value) -> BulkLogEntry {
    let message = entry
        .as_str()
        .or_else(|| entry.get("message").and_then(Value::as_str))
        .unwrap_or("Unknown warning")
        .to_string();
    BulkLogEntry {
        category: category.to_string(),
        message,
        line_number: entry.get("lineNumber").and_then(text_value),
    }
}

/// One location from the search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchLocation {
    pub name: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postalcode: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub link: Option<String>,
    pub distance: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl SearchLocation {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(text_value);
        Self {
            name: field("name"),
            address: field("address"),
            address2: field("address2"),
            city: field("city"),
            state: field("state"),
            postalcode: field("postalcode"),
            country: field("country"),
            phone: field("phone"),
            email: field("email"),
            link: field("link"),
            distance: field("distance"),
            lat: field("lat"),
            lng: field("lng"),
        }
    }

    /// Address lines assembled only from the subfields that are present.
    #[must_use]
    pub fn address_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.extend(self.address.clone());
        lines.extend(self.address2.clone());

        let locality = [&self.city, &self.state, &self.postalcode]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if !locality.is_empty() {
            lines.push(locality);
        }

        lines.extend(self.country.clone());
        lines
    }

    /// Distance in miles when the API sent a numeric value.
    #[must_use]
    pub fn distance_miles(&self) -> Option<f64> {
        self.distance
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite())
    }

    /// Latitude and longitude, only when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        Some((self.lat.as_deref()?, self.lng.as_deref()?))
    }
}

/// Parsed body of a search response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchLocation>,
}

impl SearchResponse {
    /// A missing or non-array `results` field yields no results.
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(SearchLocation::from_value).collect())
            .unwrap_or_default();
        Self { results }
    }
}

/// Non-empty string, or a number rendered as text.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bulk_response_counts_results() {
        let parsed = BulkResponse::parse(r#"{"results":[{"id":1},{"id":2},{"id":3}]}"#).unwrap();
        assert_eq!(parsed.results, Some(3));
        assert!(parsed.log.is_empty());
    }

    #[test]
    fn bulk_response_without_results_list() {
        let parsed = BulkResponse::parse(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(parsed.results, None);
    }

    #[test]
    fn bulk_response_non_array_results_is_treated_as_missing() {
        let parsed = BulkResponse::parse(r#"{"results":"done"}"#).unwrap();
        assert_eq!(parsed.results, None);
    }

    #[test]
    fn bulk_response_empty_body_has_no_results() {
        let parsed = BulkResponse::parse("  ").unwrap();
        assert_eq!(parsed.results, None);
    }

    #[test]
    fn bulk_response_rejects_malformed_json() {
        assert!(BulkResponse::parse("<html>oops</html>").is_err());
    }

    #[test]
    fn bulk_log_entries_carry_category_and_line_number() {
        let parsed = BulkResponse::from_value(json!({
            "results": [],
            "log": {
                "geocode": [
                    {"message": "Address not found", "lineNumber": 4},
                    {"message": "Ambiguous city"}
                ],
                "validation": [
                    {"lineNumber": "7"}
                ]
            }
        }));
        assert_eq!(
            parsed.log,
            vec![
                BulkLogEntry {
                    category: "geocode".to_string(),
                    message: "Address not found".to_string(),
                    line_number: Some("4".to_string()),
                },
                BulkLogEntry {
                    category: "geocode".to_string(),
                    message: "Ambiguous city".to_string(),
                    line_number: None,
                },
                BulkLogEntry {
                    category: "validation".to_string(),
                    message: "Unknown warning".to_string(),
                    line_number: Some("7".to_string()),
                },
            ]
        );
    }

    #[test]
    fn bulk_log_encoded_as_empty_array_yields_no_warnings() {
        let parsed = BulkResponse::from_value(json!({"results": [1], "log": []}));
        assert!(parsed.log.is_empty());
    }

    #[test]
    fn search_location_accepts_numeric_fields() {
        let loc = SearchLocation::from_value(&json!({
            "name": "Hub",
            "postalcode": 29401,
            "distance": "1.2345",
            "lat": 32.78,
            "lng": -79.93
        }));
        assert_eq!(loc.postalcode.as_deref(), Some("29401"));
        assert_eq!(loc.coordinates(), Some(("32.78", "-79.93")));
        let miles = loc.distance_miles().unwrap();
        assert!((miles - 1.2345).abs() < 1e-9);
    }

    #[test]
    fn coordinates_require_both_lat_and_lng() {
        let loc = SearchLocation::from_value(&json!({"lat": 32.78, "lng": null}));
        assert_eq!(loc.coordinates(), None);
    }

    #[test]
    fn address_lines_skip_absent_subfields() {
        let loc = SearchLocation::from_value(&json!({
            "address": "1 Main St",
            "city": "Charleston",
            "postalcode": "29401",
            "country": ""
        }));
        assert_eq!(loc.address_lines(), vec!["1 Main St", "Charleston, 29401"]);
    }

    #[test]
    fn search_response_missing_results_is_empty() {
        assert!(SearchResponse::from_value(&json!({})).results.is_empty());
        assert!(SearchResponse::from_value(&Value::Null).results.is_empty());
    }
}
