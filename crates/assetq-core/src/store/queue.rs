//! Pending queue persisted as `{"pending": [..]}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct PersistedQueue {
    #[serde(default)]
    pending: VecDeque<String>,
}

/// JSON-file store for the FIFO work queue. Every save overwrites the file.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default queue path for a site profile: `~/.local/state/assetq/<site>/pending_assets.json`.
    pub fn default_path(site: &str) -> Result<PathBuf> {
        Ok(crate::config::state_dir()?
            .join(site)
            .join("pending_assets.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the pending queue. A missing file is an empty queue.
    pub fn load(&self) -> Result<VecDeque<String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(VecDeque::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read queue: {}", self.path.display()))
            }
        };
        let persisted: PersistedQueue = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse queue: {}", self.path.display()))?;
        Ok(persisted.pending)
    }

    /// Overwrite the queue file with `pending`. Writes a sibling temp file and
    /// renames it over the old one so a crash never leaves a truncated queue.
    pub fn save(&self, pending: &VecDeque<String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_vec(&PersistedQueueRef { pending })
            .context("serialize queue")?;
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).with_context(|| format!("write queue: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

#[derive(Serialize)]
struct PersistedQueueRef<'a> {
    pending: &'a VecDeque<String>,
}
