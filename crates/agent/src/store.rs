//! Persistence of raw assistant replies as `N_response.json` files.

use crate::{AgentError, AgentResult};
use std::path::{Path, PathBuf};
use tracing::debug;

const RESPONSE_SUFFIX: &str = "response.json";

#[derive(Debug, Clone)]
pub struct ResponseStore {
    dir: PathBuf,
}

impl ResponseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `raw` verbatim to the next `{n}_response.json`.
    ///
    /// `n` starts at the number of stored replies; if that name is taken
    /// (an earlier file was deleted) it moves up until a free one is found.
    pub async fn store(&self, raw: &str) -> AgentResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(AgentError::io(format!("creating {}", self.dir.display())))?;

        let mut n = self.count().await?;
        let mut path = self.path_for(n);
        while tokio::fs::try_exists(&path).await.unwrap_or(false) {
            n += 1;
            path = self.path_for(n);
        }

        tokio::fs::write(&path, raw)
            .await
            .map_err(AgentError::io(format!("writing {}", path.display())))?;
        debug!("stored assistant reply at {}", path.display());
        Ok(path)
    }

    /// Number of entries whose name contains `response.json`.
    pub async fn count(&self) -> AgentResult<usize> {
        let context = || format!("listing {}", self.dir.display());
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AgentError::io(context())(e)),
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await.map_err(AgentError::io(context()))? {
            if entry.file_name().to_string_lossy().contains(RESPONSE_SUFFIX) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn path_for(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}_{}", n, RESPONSE_SUFFIX))
    }
}
