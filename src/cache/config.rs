//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values mirror the service's historical deployment profile:
// a small local cache expiring well before the remote tier.
const DEFAULT_CAPACITY: usize = 50;
const DEFAULT_LOCAL_TTL_SECS: u64 = 600;
const DEFAULT_REMOTE_TTL_SECS: u64 = 1800;
const DEFAULT_REMOTE_OP_TIMEOUT_MS: u64 = 2000;
const DEFAULT_CONCURRENCY_LIMIT: usize = 2;

/// Runtime cache parameters, resolved from `config::CacheSettings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries in the local tier.
    pub capacity: usize,
    /// Local tier entry lifetime in seconds.
    pub local_ttl_secs: u64,
    /// Remote tier entry lifetime in seconds. Must exceed the local
    /// TTL so the tiers form a fast/short, slow/long hierarchy.
    pub remote_ttl_secs: u64,
    /// Per-operation budget for any remote tier call.
    pub remote_op_timeout_ms: u64,
    /// Admission gate token pool size.
    pub concurrency_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            local_ttl_secs: DEFAULT_LOCAL_TTL_SECS,
            remote_ttl_secs: DEFAULT_REMOTE_TTL_SECS,
            remote_op_timeout_ms: DEFAULT_REMOTE_OP_TIMEOUT_MS,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            capacity: settings.capacity.get(),
            local_ttl_secs: settings.local_ttl_secs.get(),
            remote_ttl_secs: settings.remote_ttl_secs.get(),
            remote_op_timeout_ms: settings.remote_op_timeout_ms.get(),
            concurrency_limit: settings.concurrency_limit.get(),
        }
    }
}

impl CacheConfig {
    /// Local tier capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn local_ttl(&self) -> Duration {
        Duration::from_secs(self.local_ttl_secs)
    }

    pub fn remote_ttl(&self) -> Duration {
        Duration::from_secs(self.remote_ttl_secs)
    }

    pub fn remote_op_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_op_timeout_ms)
    }
}
