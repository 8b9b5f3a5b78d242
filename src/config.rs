use crate::extractors::SelectorOverrides;
use crate::fetcher::BROWSER_USER_AGENT;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportConfig,
    /// Replacement selector lists, per field
    #[serde(default)]
    pub selectors: SelectorOverrides,
}

/// Outbound request settings
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Bulk import settings
#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Maximum number of pages fetched at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

// Default value functions
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_database_url() -> String {
    "sqlite://recipes.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_concurrency() -> usize {
    4
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with GUTHUB__ prefix
    /// 2. guthub.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: GUTHUB__DATABASE__URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config("guthub")
    }
}

/// Load configuration from `<file_stem>.toml` (optional) and `GUTHUB__*` variables
pub fn load_config(file_stem: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name(file_stem).required(false))
        // Use double underscore for nested: GUTHUB__FETCH__TIMEOUT_SECS
        .add_source(
            Environment::with_prefix("GUTHUB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
