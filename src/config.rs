use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for quota evaluation and admission control.
///
/// The catalog itself is code-configured (see
/// [`PlanCatalog`](crate::plans::PlanCatalog)); this carries the runtime
/// knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotaConfig {
    /// Deadline for a single external store read, in milliseconds.
    ///
    /// A read that misses the deadline is treated as a store outage: the
    /// operation is denied, never allowed.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

fn default_store_timeout_ms() -> u64 {
    3000
}

impl QuotaConfig {
    /// The store read deadline as a [`Duration`].
    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Create a builder for this configuration.
    #[must_use]
    pub fn builder() -> QuotaConfigBuilder {
        QuotaConfigBuilder::new()
    }
}

/// Builder for [`QuotaConfig`] with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct QuotaConfigBuilder {
    config: QuotaConfig,
}

impl QuotaConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: QuotaConfig::default(),
        }
    }

    /// Set the store read deadline.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.config.store_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the store read deadline in milliseconds.
    pub fn with_store_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.store_timeout_ms = timeout_ms;
        self
    }

    /// Apply overrides from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PLATEWISE_QUOTA_STORE_TIMEOUT_MS`: store read deadline in milliseconds
    pub fn from_env(mut self) -> Self {
        if let Ok(value) = std::env::var("PLATEWISE_QUOTA_STORE_TIMEOUT_MS") {
            if let Ok(timeout_ms) = value.parse() {
                self.config.store_timeout_ms = timeout_ms;
            }
        }
        self
    }

    pub fn build(self) -> QuotaConfig {
        self.config
    }
}

impl Default for QuotaConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
