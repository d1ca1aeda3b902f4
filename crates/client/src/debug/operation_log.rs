//! In-memory operation log for debugging recent client requests

use crate::{Level, Method};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

pub const DEFAULT_OPERATION_LOG_SIZE: usize = 50;

/// A single request in the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationEntry {
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    /// Request path relative to the server root, e.g. `/c/users/cl/admins`
    pub path: String,
    /// Hierarchy level addressed, `None` for `/version`
    pub level: Option<Level>,
    /// HTTP status, if the server answered at all
    pub status: Option<u16>,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl OperationEntry {
    pub fn new(method: Method, path: impl Into<String>, level: Option<Level>) -> Self {
        Self {
            timestamp: Utc::now(),
            method,
            path: path.into(),
            level,
            status: None,
            success: false,
            duration_ms: 0,
            error: None,
        }
    }

    /// Mark the request as answered with a 2xx status
    pub fn success(mut self, status: u16, duration_ms: u64) -> Self {
        self.success = true;
        self.status = Some(status);
        self.duration_ms = duration_ms;
        self
    }

    /// Mark the request as failed; `status` is `None` for transport failures
    pub fn failure(mut self, status: Option<u16>, error: String, duration_ms: u64) -> Self {
        self.success = false;
        self.status = status;
        self.error = Some(error);
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_write(&self) -> bool {
        self.method.is_write()
    }
}

/// Thread-safe ring buffer of recent operations
#[derive(Clone, Debug)]
pub struct OperationLog {
    entries: Arc<RwLock<VecDeque<OperationEntry>>>,
    max_size: usize,
}

impl OperationLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn push(&self, entry: OperationEntry) {
        if self.max_size == 0 {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.max_size {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// All entries, newest last
    pub fn get_all(&self) -> Vec<OperationEntry> {
        self.entries
            .read()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent `n` entries, newest last
    pub fn get_recent(&self, n: usize) -> Vec<OperationEntry> {
        self.entries
            .read()
            .map(|entries| {
                let skip = entries.len().saturating_sub(n);
                entries.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<OperationEntry> {
        self.entries.read().ok().and_then(|e| e.back().cloned())
    }

    pub fn failures(&self) -> Vec<OperationEntry> {
        self.entries
            .read()
            .map(|entries| entries.iter().filter(|e| !e.success).cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATION_LOG_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_log_ring_buffer() {
        let log = OperationLog::new(3);

        for i in 0..4 {
            log.push(OperationEntry::new(
                Method::Get,
                format!("/c/col_{}", i),
                Some(Level::Collection),
            ));
        }

        assert_eq!(log.len(), 3);
        let entries = log.get_all();
        assert_eq!(entries[0].path, "/c/col_1");
        assert_eq!(entries[2].path, "/c/col_3");
        assert_eq!(log.last().unwrap().path, "/c/col_3");
    }

    #[test]
    fn test_recent_and_failures() {
        let log = OperationLog::default();
        log.push(OperationEntry::new(Method::Post, "/c/a", Some(Level::Collection)).success(200, 4));
        log.push(
            OperationEntry::new(Method::Delete, "/c/b", Some(Level::Collection)).failure(
                Some(404),
                "not found".to_string(),
                2,
            ),
        );
        log.push(OperationEntry::new(Method::Get, "/version", None).success(200, 1));

        let recent = log.get_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].path, "/c/b");
        assert_eq!(log.get_recent(10).len(), 3);

        let failures = log.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].status, Some(404));
        assert!(failures[0].is_write());

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_sized_log_keeps_nothing() {
        let log = OperationLog::new(0);
        log.push(OperationEntry::new(Method::Get, "/version", None));
        assert!(log.is_empty());
    }
}
