//! Dispatch loop: one asset at a time, gated on the in-flight download count.

use anyhow::Result;
use std::collections::VecDeque;
use std::time::Duration;

use super::item::{ItemOutcome, LinkFailure, PageDriver};
use super::pacing::jittered;
use super::stats::{RunError, SessionStats};
use crate::capacity::InFlight;
use crate::config::RunnerConfig;
use crate::control::StopToken;
use crate::store::{FailureLog, FailureRecord, ProcessedSet, QueueStore};

/// Loop parameters, usually derived from `[runner]` in config.toml.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Dispatch pauses while the gate reports at least this many in-flight downloads.
    pub capacity_limit: usize,
    /// Sleep between capacity checks while at the limit.
    pub capacity_poll: Duration,
    /// Bounds of the random delay between two items.
    pub stagger: (Duration, Duration),
    /// Stop after dispatching this many items (test sessions).
    pub item_limit: Option<usize>,
}

impl RunnerSettings {
    pub fn from_config(cfg: &RunnerConfig) -> Self {
        Self {
            capacity_limit: cfg.concurrent_limit,
            capacity_poll: cfg.capacity_poll(),
            stagger: cfg.stagger(),
            item_limit: None,
        }
    }
}

/// Runs a session's dispatch loop against the persisted stores.
pub struct Runner<'a> {
    queue_store: &'a QueueStore,
    processed: &'a mut ProcessedSet,
    failures: &'a FailureLog,
    gate: &'a dyn InFlight,
    settings: RunnerSettings,
    stop: StopToken,
}

impl<'a> Runner<'a> {
    pub fn new(
        queue_store: &'a QueueStore,
        processed: &'a mut ProcessedSet,
        failures: &'a FailureLog,
        gate: &'a dyn InFlight,
        settings: RunnerSettings,
        stop: StopToken,
    ) -> Self {
        Self {
            queue_store,
            processed,
            failures,
            gate,
            settings,
            stop,
        }
    }

    /// Dispatches queued assets in FIFO order until the queue is empty, the item
    /// limit is reached, or a stop is requested. The stop token is only checked
    /// between items, never during one.
    ///
    /// Each popped asset is terminal for this session: it is either added to the
    /// processed set or logged as a failure, and the queue file is rewritten
    /// after every item. Store or gate I/O errors end the session with a
    /// `RunError` carrying the counters reached so far.
    pub fn run(
        &mut self,
        queue: &mut VecDeque<String>,
        driver: &mut dyn PageDriver,
    ) -> Result<SessionStats, RunError> {
        let mut stats = SessionStats::default();
        let limit = self.settings.capacity_limit.max(1);
        let mut dispatched = 0usize;

        while !queue.is_empty() && !self.stop.is_stop_requested() {
            if self.limit_reached(dispatched) {
                tracing::info!(dispatched, "item limit reached");
                break;
            }

            let active = self
                .gate
                .in_flight()
                .map_err(|e| RunError::new(stats, e))?;
            tracing::debug!("capacity check: {}/{} slots active", active, limit);
            if active >= limit {
                tracing::info!(
                    active,
                    "at capacity; waiting {:?}",
                    self.settings.capacity_poll
                );
                std::thread::sleep(self.settings.capacity_poll);
                continue;
            }

            let Some(asset_id) = queue.pop_front() else {
                break;
            };
            dispatched += 1;
            tracing::info!(asset = %asset_id, remaining = queue.len(), "processing asset");

            let outcome = driver.process(&asset_id);
            let link_failures = driver.take_link_failures();
            self.record(&asset_id, outcome, link_failures, &mut stats)
                .map_err(|e| RunError::new(stats, e))?;

            self.queue_store
                .save(queue)
                .map_err(|e| RunError::new(stats, e))?;

            if !queue.is_empty()
                && !self.limit_reached(dispatched)
                && !self.stop.is_stop_requested()
            {
                std::thread::sleep(jittered(self.settings.stagger.0, self.settings.stagger.1));
            }
        }

        if self.stop.is_stop_requested() {
            tracing::warn!(remaining = queue.len(), "stopped by request");
        }
        Ok(stats)
    }

    fn limit_reached(&self, dispatched: usize) -> bool {
        self.settings
            .item_limit
            .is_some_and(|max_items| dispatched >= max_items)
    }

    fn record(
        &mut self,
        asset_id: &str,
        outcome: ItemOutcome,
        link_failures: Vec<LinkFailure>,
        stats: &mut SessionStats,
    ) -> Result<()> {
        for failure in link_failures {
            self.failures.record(&FailureRecord::now(
                asset_id,
                &failure.label,
                &failure.reason,
            ))?;
        }

        match outcome {
            ItemOutcome::Success(count) if count > 0 => {
                self.processed.insert(asset_id)?;
                stats.success += 1;
                tracing::info!(asset = %asset_id, count, "downloads requested");
            }
            ItemOutcome::Success(_) => {
                tracing::info!(
                    asset = %asset_id,
                    "links present but none matched the label filter"
                );
            }
            ItemOutcome::NoLinksFound => {
                tracing::warn!(asset = %asset_id, "no download links found");
                self.failures
                    .record(&FailureRecord::now(asset_id, "ALL", "No links found on page"))?;
                stats.failed += 1;
            }
            ItemOutcome::Error(reason) => {
                tracing::warn!(asset = %asset_id, "critical error: {}", reason);
                self.failures
                    .record(&FailureRecord::now(asset_id, "CRITICAL", &reason))?;
                stats.failed += 1;
            }
        }
        Ok(())
    }
}
