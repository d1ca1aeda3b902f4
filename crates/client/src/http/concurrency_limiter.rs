//! Concurrency limiting for OstrichDB HTTP requests
//!
//! Limiters are keyed per host and shared by every client talking to that
//! host, so several clients in one process coordinate their in-flight
//! requests. Reads (GET/HEAD) and writes (POST/PUT/DELETE) have separate
//! limits. Limiting is opt-in: with no configuration no permits are taken.
//!
//! ```bash
//! export OSTRICHDB_CONCURRENCY_LIMIT_READ=10   # Max 10 concurrent reads
//! export OSTRICHDB_CONCURRENCY_LIMIT_WRITE=5   # Max 5 concurrent writes
//! ```
//!
//! ```rust,ignore
//! let client = OstrichDBHttpClient::local_node()?
//!     .with_concurrency_limit(ConcurrencyLimitConfig::new(Some(10), Some(5)));
//! ```

use crate::Method;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

pub const READ_LIMIT_ENV: &str = "OSTRICHDB_CONCURRENCY_LIMIT_READ";
pub const WRITE_LIMIT_ENV: &str = "OSTRICHDB_CONCURRENCY_LIMIT_WRITE";

/// Both fields are optional; `None` (or zero) means no limit for that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcurrencyLimitConfig {
    pub max_concurrent_reads: Option<usize>,
    pub max_concurrent_writes: Option<usize>,
}

impl ConcurrencyLimitConfig {
    pub fn new(max_concurrent_reads: Option<usize>, max_concurrent_writes: Option<usize>) -> Self {
        Self {
            max_concurrent_reads,
            max_concurrent_writes,
        }
    }

    /// Read limits from the environment. Returns `None` if neither variable
    /// is set to a number.
    pub fn from_env() -> Option<Self> {
        let read = std::env::var(READ_LIMIT_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok());

        let write = std::env::var(WRITE_LIMIT_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok());

        if read.is_some() || write.is_some() {
            debug!(
                "Concurrency limiting configured from environment: read={:?}, write={:?}",
                read, write
            );
            Some(Self::new(read, write))
        } else {
            None
        }
    }
}

type SharedSemaphore = Arc<Semaphore>;

static GLOBAL_SEMAPHORES: Lazy<DashMap<String, ConcurrencyLimiter>> = Lazy::new(DashMap::new);

/// Read and write semaphores for one host.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyLimiter {
    read: Option<SharedSemaphore>,
    write: Option<SharedSemaphore>,
}

impl ConcurrencyLimiter {
    /// Look up the limiter for `host`, creating it from `config` on first use.
    /// Later calls for the same host return the same semaphores, whatever
    /// config they pass.
    pub fn for_host(host: &str, config: &ConcurrencyLimitConfig) -> Self {
        GLOBAL_SEMAPHORES
            .entry(host.to_string())
            .or_insert_with(|| {
                debug!(
                    "Creating semaphores for host {}: read={:?}, write={:?}",
                    host, config.max_concurrent_reads, config.max_concurrent_writes
                );
                let make = |limit: Option<usize>| {
                    limit
                        .filter(|&n| n > 0)
                        .map(|n| Arc::new(Semaphore::new(n)))
                };
                Self {
                    read: make(config.max_concurrent_reads),
                    write: make(config.max_concurrent_writes),
                }
            })
            .value()
            .clone()
    }

    pub fn is_limited(&self) -> bool {
        self.read.is_some() || self.write.is_some()
    }

    /// Wait for a permit matching the method's kind. `None` when that kind
    /// is unlimited.
    pub async fn acquire(&self, method: Method) -> Option<OwnedSemaphorePermit> {
        let semaphore = if method.is_read() {
            self.read.as_ref()
        } else {
            self.write.as_ref()
        }?;
        // The semaphores are never closed, so acquisition only fails if that changes.
        semaphore.clone().acquire_owned().await.ok()
    }

    pub fn available_reads(&self) -> Option<usize> {
        self.read.as_ref().map(|s| s.available_permits())
    }

    pub fn available_writes(&self) -> Option<usize> {
        self.write.as_ref().map(|s| s.available_permits())
    }
}
