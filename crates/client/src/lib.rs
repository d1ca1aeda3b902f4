//! # OstrichDB client
//!
//! Typed access to the OstrichDB REST surface. OstrichDB stores records inside
//! clusters inside collections, and creates every route from the names in the
//! request path, so the client's job is to address resources correctly, attach
//! the record `type`/`value` parameters each method needs, and report what the
//! server said.
//!
//! ```rust,no_run
//! use ostrichdb_client::*;
//!
//! # async fn example() -> OstrichResult<()> {
//! let client = OstrichDBHttpClient::local_node()?;
//! let record = RecordPath::new("users", "admins", "first_name")?;
//!
//! client.create_collection(record.parent().parent()).await?;
//! client.create_cluster(record.parent()).await?;
//! client.set_record(&record, RecordType::String, "Marshall").await?;
//! println!("{}", client.get_record(&record).await?);
//! # Ok(())
//! # }
//! ```

pub mod debug;
pub mod err;
pub mod http;
pub mod info;
mod method;
mod path;
mod record;

pub use {
    err::{OstrichError, OstrichResult},
    http::{
        ConcurrencyLimitConfig, ConcurrencyLimiter, OstrichDBHttpClient, OstrichResponse,
        UrlBuilder, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HOST_ENV, TIMEOUT_ENV,
    },
    info::ServerVersion,
    method::Method,
    path::{ClusterPath, CollectionPath, Level, RecordPath, ResourcePath},
    record::{RecordParams, RecordType, RecordValue},
};
