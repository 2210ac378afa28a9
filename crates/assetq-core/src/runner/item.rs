//! Collaborator seams: the site indexer and the per-item page driver.

use anyhow::Result;

use crate::control::StopToken;

/// Result of processing one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Number of download links that were triggered or whose file was already
    /// on disk. Zero means links were present but every one was excluded by
    /// the label filter.
    Success(usize),
    /// The detail page had no download links at all.
    NoLinksFound,
    /// Navigation or page handling failed.
    Error(String),
}

/// A single link that could not be triggered while the asset as a whole went on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    pub label: String,
    pub reason: String,
}

/// Performs the site-specific interaction for one asset.
pub trait PageDriver {
    fn process(&mut self, asset_id: &str) -> ItemOutcome;

    /// Per-link failures collected during the last `process` call.
    fn take_link_failures(&mut self) -> Vec<LinkFailure> {
        Vec::new()
    }
}

/// Enumerates every asset identifier the site currently lists, in listing order.
pub trait SiteIndexer {
    fn index(&mut self, stop: &StopToken) -> Result<Vec<String>>;
}
