use std::net::SocketAddr;
use std::time::Duration;

use gatesync_core::{GrantPolicy, GroupId};
use gatesync_engine::BatchLimits;

/// Configuration for the gatesync service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the HTTP trigger server (`serve` mode only).
    pub listen_addr: SocketAddr,

    /// Base URL of the workforce-compliance platform.
    pub source_base_url: String,

    /// API key for the workforce-compliance platform.
    pub source_api_key: String,

    /// Base URL of the access-control platform.
    pub target_base_url: String,

    /// API token for the access-control platform.
    pub target_api_token: String,

    /// Access group that reconciled grants are created in.
    pub group_id: i64,

    /// Prefix for grant labels; also marks which grants this integration
    /// owns and may delete.
    pub name_prefix: String,

    /// Seconds between scheduled reconciliation runs (`serve` mode only).
    pub sync_interval_secs: u64,

    /// Number of grant mutations issued together.
    pub batch_size: usize,

    /// Pause between mutation batches, in milliseconds.
    pub batch_delay_ms: u64,

    /// Where accumulated failure messages are POSTed after each run.
    /// When unset, failures are logged and dropped on flush.
    pub error_webhook_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let listen_addr = reader("GATESYNC_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("GATESYNC_LISTEN_ADDR".into(), e.to_string()))?;

        let source_base_url = reader("GATESYNC_SOURCE_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_SOURCE_BASE_URL".into()))?;
        let source_api_key = reader("GATESYNC_SOURCE_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_SOURCE_API_KEY".into()))?;
        let target_base_url = reader("GATESYNC_TARGET_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_TARGET_BASE_URL".into()))?;
        let target_api_token = reader("GATESYNC_TARGET_API_TOKEN")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_TARGET_API_TOKEN".into()))?;

        let group_id = reader("GATESYNC_GROUP_ID")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_GROUP_ID".into()))?
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue("GATESYNC_GROUP_ID".into(), e.to_string()))?;

        let name_prefix = reader("GATESYNC_NAME_PREFIX")
            .map_err(|_| ConfigError::MissingVar("GATESYNC_NAME_PREFIX".into()))?;

        let sync_interval_secs = reader("GATESYNC_SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidValue("GATESYNC_SYNC_INTERVAL_SECS".into(), e.to_string())
            })?;

        let batch_size = reader("GATESYNC_BATCH_SIZE")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<usize>()
            .unwrap_or(5);

        let batch_delay_ms = reader("GATESYNC_BATCH_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .unwrap_or(1000);

        let error_webhook_url = reader("GATESYNC_ERROR_WEBHOOK_URL").ok();

        Ok(Self {
            listen_addr,
            source_base_url,
            source_api_key,
            target_base_url,
            target_api_token,
            group_id,
            name_prefix,
            sync_interval_secs,
            batch_size,
            batch_delay_ms,
            error_webhook_url,
        })
    }

    /// Label/group policy handed to the engine and eligibility evaluation.
    #[must_use]
    pub fn grant_policy(&self) -> GrantPolicy {
        GrantPolicy {
            name_prefix: self.name_prefix.clone(),
            group_id: GroupId::new(self.group_id),
        }
    }

    /// Mutation batching limits for the engine.
    #[must_use]
    pub fn batch_limits(&self) -> BatchLimits {
        BatchLimits {
            batch_size: self.batch_size,
            delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
