//! `assetq status` – show queue, history, and failure counts for a site.

use anyhow::Result;
use assetq_core::capacity::{CapacityGate, InFlight};
use assetq_core::config::AssetqConfig;
use assetq_core::logging;
use assetq_core::store::{FailureLog, ProcessedSet, QueueStore, FAILURE_LOG_FILE, HISTORY_FILE};

use crate::cli::download_dir;

const PREVIEW: usize = 5;

pub async fn run_status(cfg: &AssetqConfig, site: Option<&str>) -> Result<()> {
    let (site, _) = cfg.site(site)?;
    let queue_store = QueueStore::new(QueueStore::default_path(site)?);
    let pending = queue_store.load()?;

    println!("Site:     {}", site);
    println!("Log:      {}", logging::log_path()?.display());
    if pending.is_empty() {
        println!("Pending:  0 (next run indexes the site)");
    } else {
        let next: Vec<&str> = pending.iter().take(PREVIEW).map(String::as_str).collect();
        let more = if pending.len() > PREVIEW { ", ..." } else { "" };
        println!("Pending:  {} (next: {}{})", pending.len(), next.join(", "), more);
    }

    let Some(dir) = download_dir::saved()? else {
        println!("Download path not set; run `assetq run` first.");
        return Ok(());
    };
    let processed = ProcessedSet::open(dir.join(HISTORY_FILE))?;
    let failures = FailureLog::new(dir.join(FAILURE_LOG_FILE));
    let gate = CapacityGate::new(&dir, &cfg.runner.incomplete_suffix);
    println!("Path:     {}", dir.display());
    println!("Done:     {}", processed.len());
    println!("Failures: {}", failures.count()?);
    println!("Active:   {}", gate.in_flight()?);
    Ok(())
}
