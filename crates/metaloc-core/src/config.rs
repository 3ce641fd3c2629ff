use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::app_config::AppConfig;
use crate::{ConfigError, PLACEHOLDER_API_KEY};

/// Where the CLI looks for the configuration file when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/metaloc.yaml";

const DEFAULT_API_BASE_URL: &str = "https://admin-api.metalocator.com/api/v1";
const DEFAULT_CSV_FILE: &str = "sample_locations.csv";

/// Raw contents of the YAML configuration file.
///
/// Every key is optional here; defaults and validation are applied by
/// [`load_app_config_from_env`] after environment overrides are merged in.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub item_id: Option<String>,
    /// Seconds to wait between bulk batches.
    pub rate_limit_delay: Option<f64>,
    pub batch_size: Option<usize>,
    pub csv_file: Option<String>,
    pub debug: Option<bool>,
    pub log_level: Option<String>,
    pub bulk_timeout_secs: Option<u64>,
    pub search_timeout_secs: Option<u64>,
    pub rate_limit_per_minute: Option<usize>,
    pub default_radius: Option<f64>,
    pub default_limit: Option<u32>,
    pub assume_success_without_results: Option<bool>,
    pub count_shortfall_as_failed: Option<bool>,
}

/// Load application configuration from `path`, with overrides from
/// environment variables already in the process.
///
/// Does not load `.env`; the binary does that once at startup.
///
/// # Errors
///
/// Returns `ConfigError` if the file is missing or malformed, the API key is
/// missing or a placeholder, or any value fails validation.
pub fn load_app_config_from_env(path: &Path) -> Result<AppConfig, ConfigError> {
    let file = read_config_file(path)?;
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_app_config(file, config_dir, |key| std::env::var(key))
}

/// Read and parse the YAML configuration file.
///
/// An empty file parses to [`ConfigFile::default`].
///
/// # Errors
///
/// Returns [`ConfigError::ConfigFileIo`] if the file cannot be read and
/// [`ConfigError::ConfigFileParse`] if it is not valid YAML for [`ConfigFile`].
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    Ok(serde_yaml::from_str(&content)?)
}

/// Merge file values with env-var overrides and validate the result.
///
/// Env lookups go through `lookup` so tests can use a plain `HashMap`
/// instead of mutating the process environment.
fn build_app_config<F>(
    file: ConfigFile,
    config_dir: &Path,
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let string = |var: &str, file_value: Option<String>| -> Option<String> {
        lookup(var).ok().or(file_value)
    };

    let api_key = string("METALOC_API_KEY", file.api_key)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingApiKey)?;
    if api_key == PLACEHOLDER_API_KEY {
        return Err(ConfigError::PlaceholderApiKey);
    }

    let api_base_url = string("METALOC_API_BASE_URL", file.api_base_url)
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let item_id = string("METALOC_ITEM_ID", file.item_id);
    let log_level =
        string("METALOC_LOG_LEVEL", file.log_level).unwrap_or_else(|| "info".to_string());

    let csv_file =
        string("METALOC_CSV_FILE", file.csv_file).unwrap_or_else(|| DEFAULT_CSV_FILE.to_string());
    let csv_path = resolve_relative(config_dir, &csv_file);

    let delay_secs = parsed(&lookup, "METALOC_RATE_LIMIT_DELAY_SECS", file.rate_limit_delay, 1.0)?;
    let rate_limit_delay = Duration::try_from_secs_f64(delay_secs).map_err(|_| {
        ConfigError::Validation(format!(
            "rate_limit_delay must be a finite, non-negative number of seconds (got {delay_secs})"
        ))
    })?;

    let batch_size = parsed(&lookup, "METALOC_BATCH_SIZE", file.batch_size, 50)?;
    if batch_size == 0 {
        return Err(ConfigError::Validation(
            "batch_size must be at least 1".to_string(),
        ));
    }

    let rate_limit_per_minute = parsed(
        &lookup,
        "METALOC_RATE_LIMIT_PER_MINUTE",
        file.rate_limit_per_minute,
        60,
    )?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::Validation(
            "rate_limit_per_minute must be at least 1".to_string(),
        ));
    }

    let default_radius = parsed(&lookup, "METALOC_DEFAULT_RADIUS", file.default_radius, 25.0)?;
    if !default_radius.is_finite() || default_radius <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "default_radius must be a positive number (got {default_radius})"
        )));
    }

    let bulk_timeout_secs = parsed(
        &lookup,
        "METALOC_BULK_TIMEOUT_SECS",
        file.bulk_timeout_secs,
        60,
    )?;
    let search_timeout_secs = parsed(
        &lookup,
        "METALOC_SEARCH_TIMEOUT_SECS",
        file.search_timeout_secs,
        10,
    )?;
    if bulk_timeout_secs == 0 || search_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "bulk_timeout_secs and search_timeout_secs must be at least 1".to_string(),
        ));
    }

    let default_limit = parsed(&lookup, "METALOC_DEFAULT_LIMIT", file.default_limit, 20)?;
    if default_limit == 0 {
        return Err(ConfigError::Validation(
            "default_limit must be at least 1".to_string(),
        ));
    }

    let debug = flag(&lookup, "METALOC_DEBUG", file.debug, false)?;
    let assume_success_without_results = flag(
        &lookup,
        "METALOC_ASSUME_SUCCESS_WITHOUT_RESULTS",
        file.assume_success_without_results,
        true,
    )?;
    let count_shortfall_as_failed = flag(
        &lookup,
        "METALOC_COUNT_SHORTFALL_AS_FAILED",
        file.count_shortfall_as_failed,
        false,
    )?;

    Ok(AppConfig {
        api_key,
        api_base_url,
        item_id,
        rate_limit_delay,
        batch_size,
        csv_path,
        debug,
        log_level,
        bulk_timeout_secs,
        search_timeout_secs,
        rate_limit_per_minute,
        default_radius,
        default_limit,
        assume_success_without_results,
        count_shortfall_as_failed,
    })
}

/// Env var wins, then the file value, then `default`.
fn parsed<F, T>(lookup: &F, var: &str, file_value: Option<T>, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(file_value.unwrap_or(default)),
    }
}

fn flag<F>(lookup: &F, var: &str, file_value: Option<bool>, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let Ok(raw) = lookup(var) else {
        return Ok(file_value.unwrap_or(default));
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn resolve_relative(base: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
