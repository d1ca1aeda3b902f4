//! Debugging and logging functionality for the OstrichDB client
//!
//! - An in-memory operation log (ring buffer) of recent requests
//! - An optional JSON-lines request log file for audit trails

pub mod operation_log;
pub mod request_log;

pub use operation_log::{OperationEntry, OperationLog};
pub use request_log::{OperationFilter, RequestLogger};
