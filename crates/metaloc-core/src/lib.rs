pub mod app_config;
pub mod config;
pub mod record;

pub use app_config::AppConfig;
pub use config::{load_app_config_from_env, read_config_file, ConfigFile, DEFAULT_CONFIG_PATH};
pub use record::{LocationRecord, RecordError};

use thiserror::Error;

/// Value shipped in the example configuration; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Value shipped in the example configuration; treated the same as a missing item id.
pub const PLACEHOLDER_ITEM_ID: &str = "YOUR_ITEM_ID_HERE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found or unreadable: {path}: {source}")]
    ConfigFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    ConfigFileParse(#[from] serde_yaml::Error),

    #[error("API key is not configured; set api_key in the config file or METALOC_API_KEY")]
    MissingApiKey,

    #[error("API key is still the placeholder value; configure your own key")]
    PlaceholderApiKey,

    #[error("item id is not configured; set item_id in the config file or METALOC_ITEM_ID")]
    MissingItemId,

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation error: {0}")]
    Validation(String),
}
