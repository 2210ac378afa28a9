//! Capacity gate: infers how many downloads are in flight from the download directory.
//!
//! The download manager gives no completion callback, only a naming convention:
//! a transfer writes `<name><suffix>` and renames it to `<name>` when done. The
//! count of suffixed entries is therefore an estimate, and it can change between
//! the check and the next decision. It is a heuristic, not a semaphore.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Counts directory entries whose file name ends with `suffix`.
pub fn estimate_in_flight(dir: &Path, suffix: &str) -> Result<usize> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("list download dir: {}", dir.display()))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            count += 1;
        }
    }
    Ok(count)
}

/// Anything that can report the current in-flight download count.
pub trait InFlight {
    fn in_flight(&self) -> Result<usize>;
}

/// Filesystem-backed gate over one download directory.
#[derive(Debug, Clone)]
pub struct CapacityGate {
    dir: PathBuf,
    suffix: String,
}

impl CapacityGate {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }
}

impl InFlight for CapacityGate {
    fn in_flight(&self) -> Result<usize> {
        estimate_in_flight(&self.dir, &self.suffix)
    }
}
