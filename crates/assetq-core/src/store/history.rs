//! Processed history: one identifier per line, append-only.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// In-memory view of the processed history plus the file it is appended to.
#[derive(Debug)]
pub struct ProcessedSet {
    path: PathBuf,
    ids: HashSet<String>,
}

impl ProcessedSet {
    /// Load the history at `path`. A missing file is an empty set; blank lines are ignored.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ids = match std::fs::read_to_string(&path) {
            Ok(data) => data
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read history: {}", path.display()))
            }
        };
        Ok(Self { path, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record `id` as processed and append it to the history file.
    /// Ids already present are not written again.
    pub fn insert(&mut self, id: &str) -> Result<()> {
        if self.ids.contains(id) {
            return Ok(());
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open history: {}", self.path.display()))?;
        writeln!(file, "{}", id)
            .with_context(|| format!("append history: {}", self.path.display()))?;
        self.ids.insert(id.to_string());
        Ok(())
    }
}
