use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Rajpatra
///
/// Every section and field has a default, so an empty TOML file (or no file
/// at all) yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

/// Fetcher behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent on every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of attempts for one fetch
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base retry delay (seconds); the sleep before attempt N+1 is N times this
    #[serde(rename = "retry-delay-secs")]
    pub retry_delay_secs: u64,

    /// Politeness pre-delay before every attempt (seconds); 0 disables
    #[serde(rename = "backoff-secs")]
    pub backoff_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:59.0) \
                         Gecko/20100101 Firefox/59.0"
                .to_string(),
            request_timeout_secs: 400,
            connect_timeout_secs: 10,
            max_attempts: 3,
            retry_delay_secs: 100,
            backoff_secs: 0,
        }
    }
}

impl FetchConfig {
    /// Whole-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Politeness pre-delay as a Duration
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

/// Date-range synchronization configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How many days before today a daily sync starts
    #[serde(rename = "lookback-days")]
    pub lookback_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig { lookback_days: 15 }
    }
}

/// Storage layout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for raw documents, metadata, and ledgers
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Minimum size for a fetched document to count as valid; 0 disables
    #[serde(rename = "min-raw-bytes")]
    pub min_raw_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: "data".to_string(),
            min_raw_bytes: 0,
        }
    }
}
