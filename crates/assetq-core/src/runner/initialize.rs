//! Session start: resume the persisted queue or build a fresh one from the site index.

use anyhow::{Context, Result};
use std::collections::{HashSet, VecDeque};

use super::item::SiteIndexer;
use crate::control::StopToken;
use crate::store::{ProcessedSet, QueueStore};

/// Returns the work queue for this session.
///
/// A non-empty persisted queue is resumed without indexing. Ids that reached
/// the history but not the queue file (a crash between the two writes) and
/// repeated ids are dropped, and the queue file is rewritten if that changed it.
/// Otherwise the site is indexed and the result, minus processed ids, is
/// persisted (possibly as an empty list).
pub fn initialize(
    queue_store: &QueueStore,
    processed: &ProcessedSet,
    indexer: &mut dyn SiteIndexer,
    stop: &StopToken,
) -> Result<VecDeque<String>> {
    let persisted = queue_store.load()?;
    if !persisted.is_empty() {
        let loaded = persisted.len();
        let pending = unprocessed(persisted, processed);
        if pending.len() != loaded {
            tracing::warn!(
                dropped = loaded - pending.len(),
                "persisted queue held processed or repeated ids"
            );
            queue_store.save(&pending)?;
        }
        if !pending.is_empty() {
            tracing::info!(
                pending = pending.len(),
                "resuming persisted queue from {}",
                queue_store.path().display()
            );
            return Ok(pending);
        }
    }
    tracing::info!("queue empty; indexing site");
    build_queue(queue_store, processed, indexer, stop)
}

/// Keeps ids not in `processed`, in order, first occurrence only.
fn unprocessed(
    ids: impl IntoIterator<Item = String>,
    processed: &ProcessedSet,
) -> VecDeque<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| !processed.contains(id) && seen.insert(id.clone()))
        .collect()
}

/// Indexes the site and overwrites the persisted queue with every listed id that
/// is not yet processed. Listing order is kept; repeated ids keep their first position.
pub fn build_queue(
    queue_store: &QueueStore,
    processed: &ProcessedSet,
    indexer: &mut dyn SiteIndexer,
    stop: &StopToken,
) -> Result<VecDeque<String>> {
    let ids = indexer.index(stop).context("index site")?;
    let listed = ids.len();
    let queue = unprocessed(ids, processed);
    queue_store.save(&queue)?;
    tracing::info!(
        listed,
        queued = queue.len(),
        "indexing complete; {} assets added to queue",
        queue.len()
    );
    Ok(queue)
}
