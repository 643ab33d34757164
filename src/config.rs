//! Session configuration loading and validation.
//!
//! Configuration comes from a YAML file; the per-process options
//! (`AGENCY_ID`, `SERVER_ADDRESS`, `DATA_FILE`) can be overridden
//! through the environment so one file serves every agency container.
//! Durations are stored as integer milliseconds and read through the
//! accessor methods.
//!
//! # Example
//!
//! ```
//! use betwire::config::SessionConfig;
//!
//! let yaml = r#"
//! agency_id: 1
//! server_address: 127.0.0.1:9090
//! data_file: .data/agency-1.csv
//! "#;
//! let config = SessionConfig::from_yaml(yaml).unwrap();
//! assert_eq!(config.max_batch_records, 100);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BetwireError, Result};
use crate::transport::RetryPolicy;

fn default_max_batch_records() -> usize {
    100
}

fn default_max_batch_bytes() -> usize {
    8 * 1024
}

fn default_batch_delay_ms() -> u64 {
    5_000
}

fn default_handshake_max_attempts() -> u32 {
    5
}

fn default_handshake_retry_delay_ms() -> u64 {
    1_000
}

/// Everything one session run needs to know.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Submitting agency id.
    #[serde(default)]
    pub agency_id: u32,
    /// Aggregator address, `host:port`.
    #[serde(default)]
    pub server_address: String,
    /// Agency dataset path (CSV, no header row).
    #[serde(default)]
    pub data_file: String,
    /// Record-count cap per batch.
    #[serde(default = "default_max_batch_records")]
    pub max_batch_records: usize,
    /// Byte cap per batch. Counts record payload only; the 9-byte
    /// header is not charged against it.
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,
    /// Pause between batches.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Total dial attempts per connection, the first included.
    #[serde(default = "default_handshake_max_attempts")]
    pub handshake_max_attempts: u32,
    /// Pause between failed dial attempts.
    #[serde(default = "default_handshake_retry_delay_ms")]
    pub handshake_retry_delay_ms: u64,
}

impl SessionConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BetwireError::Config(format!("read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string.
    ///
    /// Environment overrides apply after parsing, validation after
    /// that.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: SessionConfig = serde_yaml::from_str(yaml)
            .map_err(|e| BetwireError::Config(format!("parse config: {}", e)))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override per-process options from the environment.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("AGENCY_ID") {
            self.agency_id = value.parse().map_err(|_| {
                BetwireError::Config(format!("AGENCY_ID {:?} is not a number", value))
            })?;
        }
        if let Ok(value) = std::env::var("SERVER_ADDRESS") {
            self.server_address = value;
        }
        if let Ok(value) = std::env::var("DATA_FILE") {
            self.data_file = value;
        }
        Ok(())
    }

    /// Reject configurations the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.agency_id == 0 {
            return Err(BetwireError::Config("agency_id must be set".to_string()));
        }
        if self.server_address.is_empty() {
            return Err(BetwireError::Config(
                "server_address must be set".to_string(),
            ));
        }
        if self.data_file.is_empty() {
            return Err(BetwireError::Config("data_file must be set".to_string()));
        }
        if self.max_batch_records == 0 {
            return Err(BetwireError::Config(
                "max_batch_records must be at least 1".to_string(),
            ));
        }
        if self.max_batch_bytes == 0 {
            return Err(BetwireError::Config(
                "max_batch_bytes must be at least 1".to_string(),
            ));
        }
        if self.handshake_max_attempts == 0 {
            return Err(BetwireError::Config(
                "handshake_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause between batches.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Pause between failed dial attempts.
    pub fn handshake_retry_delay(&self) -> Duration {
        Duration::from_millis(self.handshake_retry_delay_ms)
    }

    /// Retry schedule for the connect handshake.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.handshake_max_attempts, self.handshake_retry_delay())
    }
}
