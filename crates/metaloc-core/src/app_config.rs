use std::path::PathBuf;
use std::time::Duration;

use crate::{ConfigError, PLACEHOLDER_ITEM_ID};

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub item_id: Option<String>,
    pub rate_limit_delay: Duration,
    pub batch_size: usize,
    pub csv_path: PathBuf,
    pub debug: bool,
    pub log_level: String,
    pub bulk_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub rate_limit_per_minute: usize,
    pub default_radius: f64,
    pub default_limit: u32,
    pub assume_success_without_results: bool,
    pub count_shortfall_as_failed: bool,
}

impl AppConfig {
    /// Returns the configured search interface id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingItemId`] when the id is absent, blank, or
    /// still the example placeholder.
    pub fn require_item_id(&self) -> Result<&str, ConfigError> {
        match self.item_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && id != PLACEHOLDER_ITEM_ID => Ok(id),
            _ => Err(ConfigError::MissingItemId),
        }
    }

    /// The filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_log_filter(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("item_id", &self.item_id)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("batch_size", &self.batch_size)
            .field("csv_path", &self.csv_path)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("bulk_timeout_secs", &self.bulk_timeout_secs)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("default_radius", &self.default_radius)
            .field("default_limit", &self.default_limit)
            .field(
                "assume_success_without_results",
                &self.assume_success_without_results,
            )
            .field("count_shortfall_as_failed", &self.count_shortfall_as_failed)
            .finish()
    }
}
