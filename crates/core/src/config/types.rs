use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("magnetar.db")
}

/// Storage layout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root of the categorized storage tree (one subdirectory per category).
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,
    /// Root for in-flight download work directories.
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            download_root: default_download_root(),
        }
    }
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_download_root() -> PathBuf {
    PathBuf::from("downloads")
}

/// Indexer search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Per-request timeout for indexer scrapes, in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u32,
    /// Stop scraping a source once this many results were collected.
    #[serde(default = "default_source_quota")]
    pub per_source_quota: usize,
    /// Trackers whose raw search URLs are offered as fallback links.
    #[serde(default = "default_trackers")]
    pub trackers: Vec<TrackerConfig>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_search_timeout(),
            per_source_quota: default_source_quota(),
            trackers: default_trackers(),
        }
    }
}

/// A tracker entry used for fallback search links.
///
/// `search_url` must contain a `{query}` placeholder.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    pub name: String,
    pub search_url: String,
}

fn default_search_timeout() -> u32 {
    5
}

fn default_source_quota() -> usize {
    3
}

fn default_trackers() -> Vec<TrackerConfig> {
    [
        (
            "The Pirate Bay",
            "https://thepiratebay.org/search/{query}/0/99/0",
        ),
        (
            "RuTracker",
            "https://rutracker.org/forum/tracker.php?nm={query}",
        ),
        ("Kinozal", "https://kinozal.tv/browse.php?s={query}"),
    ]
    .into_iter()
    .map(|(name, url)| TrackerConfig {
        name: name.to_string(),
        search_url: url.to_string(),
    })
    .collect()
}

/// Download job configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Worker status poll cadence in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Progress stream wait cadence in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub stream_interval_ms: u64,
    /// Message shown to clients when the downloader becomes unavailable
    /// mid-transfer. Raw downloader errors pass through unchanged.
    #[serde(default = "default_unavailable_message")]
    pub unavailable_message: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            stream_interval_ms: default_poll_interval(),
            unavailable_message: default_unavailable_message(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_unavailable_message() -> String {
    "torrent downloader became unavailable".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub search: SanitizedSearchConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub timeout_secs: u32,
    pub per_source_quota: usize,
    pub trackers: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            search: SanitizedSearchConfig {
                timeout_secs: config.search.timeout_secs,
                per_source_quota: config.search.per_source_quota,
                trackers: config
                    .search
                    .trackers
                    .iter()
                    .map(|t| t.name.clone())
                    .collect(),
            },
        }
    }
}
