//! Ticket lifecycle tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Ticket lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TicketConfig {
    /// Delay between announcing a close and deleting the channel
    #[serde(default = "default_close_grace")]
    pub close_grace_secs: u64,

    /// Upper bound on every mapping store call
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

impl TicketConfig {
    pub fn close_grace(&self) -> Duration {
        Duration::from_secs(self.close_grace_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate ticket configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.close_grace_secs > 300 {
            return Err(ValidationError::InvalidGraceDelay);
        }
        if self.store_timeout_ms == 0 || self.store_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidStoreTimeout);
        }
        Ok(())
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            close_grace_secs: default_close_grace(),
            store_timeout_ms: default_store_timeout(),
        }
    }
}

fn default_close_grace() -> u64 {
    5
}

fn default_store_timeout() -> u64 {
    5_000
}
