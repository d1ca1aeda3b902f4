//! File-based request logging for persistent audit trails

use super::OperationEntry;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Filter options for operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationFilter {
    All,
    /// GET and HEAD only
    ReadsOnly,
    /// POST, PUT and DELETE only
    WritesOnly,
}

impl OperationFilter {
    fn includes(&self, entry: &OperationEntry) -> bool {
        match self {
            OperationFilter::All => true,
            OperationFilter::ReadsOnly => !entry.is_write(),
            OperationFilter::WritesOnly => entry.is_write(),
        }
    }
}

fn to_log_line(entry: &OperationEntry) -> String {
    match serde_json::to_string(entry) {
        Ok(json) => json + "\n",
        Err(e) => {
            error!("Failed to serialize request log entry: {}", e);
            format!("{{\"error\": \"serialization failed: {}\"}}\n", e)
        }
    }
}

/// Async append-only JSON-lines logger
#[derive(Clone, Debug)]
pub struct RequestLogger {
    file_path: PathBuf,
    file_handle: Arc<Mutex<Option<File>>>,
    enabled: Arc<Mutex<bool>>,
}

impl RequestLogger {
    pub async fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        Ok(Self {
            file_path,
            file_handle: Arc::new(Mutex::new(Some(file))),
            enabled: Arc::new(Mutex::new(true)),
        })
    }

    /// Append an entry. Write failures are logged, never returned.
    pub async fn log(&self, entry: &OperationEntry) {
        if !*self.enabled.lock().await {
            return;
        }

        let log_line = to_log_line(entry);

        let mut file_guard = self.file_handle.lock().await;
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = file.write_all(log_line.as_bytes()).await {
                error!("Failed to write to request log: {}", e);
            }
            if let Err(e) = file.flush().await {
                warn!("Failed to flush request log: {}", e);
            }
        }
    }

    pub async fn set_enabled(&self, enabled: bool) {
        *self.enabled.lock().await = enabled;
        debug!(
            "Request logging {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub async fn is_enabled(&self) -> bool {
        *self.enabled.lock().await
    }

    /// Close the current file, rename it with a timestamp suffix, open a new one
    pub async fn rotate(&self) -> std::io::Result<()> {
        let mut file_guard = self.file_handle.lock().await;
        file_guard.take();

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let stem = self
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "requests".to_string());
        let rotated_path = self
            .file_path
            .with_file_name(format!("{}.{}", stem, timestamp));

        if tokio::fs::try_exists(&self.file_path).await? {
            tokio::fs::rename(&self.file_path, rotated_path).await?;
        }

        let new_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await?;

        *file_guard = Some(new_file);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Entries at least as slow as `threshold` (default 1 s), slowest first
    pub async fn get_slow_entries(
        &self,
        threshold: Option<Duration>,
        filter: Option<OperationFilter>,
        limit: Option<usize>,
    ) -> std::io::Result<Vec<OperationEntry>> {
        let threshold_ms = threshold.unwrap_or(Duration::from_secs(1)).as_millis() as u64;
        let filter = filter.unwrap_or(OperationFilter::All);

        let file = File::open(&self.file_path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut entries = Vec::new();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<OperationEntry>(trimmed) {
                Ok(entry) if entry.duration_ms >= threshold_ms && filter.includes(&entry) => {
                    entries.push(entry)
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to parse request log entry: {}", e),
            }
        }

        entries.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}
