//! OstrichDB HTTP Client Module
//!
//! - `client`: core client struct, constructors and the shared request path
//! - `collection`, `cluster`, `record`: per-level operations
//! - `concurrency_limiter`: optional per-host read/write limits
//! - `response`: response capture
//! - `url_builder`: URL construction

pub mod client;
pub mod cluster;
pub mod collection;
pub mod concurrency_limiter;
pub mod record;
pub mod response;
pub mod url_builder;

pub use client::{OstrichDBHttpClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HOST_ENV, TIMEOUT_ENV};
pub use concurrency_limiter::{ConcurrencyLimitConfig, ConcurrencyLimiter};
pub use response::OstrichResponse;
pub use url_builder::UrlBuilder;

use crate::OstrichResult;

/// Map a HEAD outcome to existence: 2xx is `true`, 404 is `false`, any other
/// failure is returned.
fn exists(result: OstrichResult<OstrichResponse>) -> OstrichResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}
