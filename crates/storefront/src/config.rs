//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MEDICARE_API_BASE_URL` - Backend API base URL (default: `http://localhost:8083/api`)
//! - `MEDICARE_DATA_DIR` - Directory holding the durable and session stores (default: `.medicare`)
//! - `MEDICARE_CATALOG_PAGE_SIZE` - Products fetched per catalog load, 1-1000 (default: 100)
//! - `MEDICARE_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `MEDICARE_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime, 0 disables (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8083/api";

const DEFAULT_DATA_DIR: &str = ".medicare";
const DEFAULT_PAGE_SIZE: u32 = 100;
const MAX_PAGE_SIZE: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// File name of the durable store inside the data directory.
pub const DURABLE_STORE_FILE: &str = "storage.json";
/// File name of the session store inside the data directory.
pub const SESSION_STORE_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Backend API base URL
    pub api_base_url: Url,
    /// Directory for persisted state
    pub data_dir: PathBuf,
    /// Page size used when loading the catalog
    pub catalog_page_size: u32,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
    /// Lifetime of cached product responses
    pub product_cache_ttl: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            product_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_base_url = match get("MEDICARE_API_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.api_base_url,
        };

        let data_dir = get("MEDICARE_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);

        let catalog_page_size = match get("MEDICARE_CATALOG_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => defaults.catalog_page_size,
        };

        let http_timeout = match get("MEDICARE_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = parse_secs("MEDICARE_HTTP_TIMEOUT_SECS", &raw)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidEnvVar(
                        "MEDICARE_HTTP_TIMEOUT_SECS".to_string(),
                        "must be greater than 0".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        let product_cache_ttl = match get("MEDICARE_PRODUCT_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("MEDICARE_PRODUCT_CACHE_TTL_SECS", &raw)?),
            None => defaults.product_cache_ttl,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            catalog_page_size,
            http_timeout,
            product_cache_ttl,
        })
    }

    /// Path of the durable store file.
    #[must_use]
    pub fn durable_store_path(&self) -> PathBuf {
        self.data_dir.join(DURABLE_STORE_FILE)
    }

    /// Path of the session store file.
    #[must_use]
    pub fn session_store_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_STORE_FILE)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("MEDICARE_API_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "MEDICARE_API_BASE_URL".to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    let size = raw.trim().parse::<u32>().map_err(|e| {
        ConfigError::InvalidEnvVar("MEDICARE_CATALOG_PAGE_SIZE".to_string(), e.to_string())
    })?;
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ConfigError::InvalidEnvVar(
            "MEDICARE_CATALOG_PAGE_SIZE".to_string(),
            format!("must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    Ok(size)
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8083/api");
        assert_eq!(config.catalog_page_size, 100);
        assert_eq!(config.durable_store_path(), PathBuf::from(".medicare/storage.json"));
        assert_eq!(config.session_store_path(), PathBuf::from(".medicare/session.json"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MEDICARE_API_BASE_URL", "https://api.medicare.example/api"),
            ("MEDICARE_DATA_DIR", "/tmp/medicare"),
            ("MEDICARE_CATALOG_PAGE_SIZE", "25"),
            ("MEDICARE_HTTP_TIMEOUT_SECS", "3"),
            ("MEDICARE_PRODUCT_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url.host_str(), Some("api.medicare.example"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/medicare"));
        assert_eq!(config.catalog_page_size, 25);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.product_cache_ttl.is_zero());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("MEDICARE_CATALOG_PAGE_SIZE", "  ")]).unwrap();
        assert_eq!(config.catalog_page_size, 100);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            load(&[("MEDICARE_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(load(&[("MEDICARE_API_BASE_URL", "ftp://example.com/api")]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_numbers() {
        assert!(load(&[("MEDICARE_CATALOG_PAGE_SIZE", "0")]).is_err());
        assert!(load(&[("MEDICARE_CATALOG_PAGE_SIZE", "5000")]).is_err());
        assert!(load(&[("MEDICARE_HTTP_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("MEDICARE_HTTP_TIMEOUT_SECS", "-1")]).is_err());
    }
}
