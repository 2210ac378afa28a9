//! `assetq run` – index if needed, dispatch the queue, then drain.

use anyhow::{Context, Result};
use assetq_core::capacity::CapacityGate;
use assetq_core::config::{AssetqConfig, RunnerConfig, SiteProfile};
use assetq_core::control::{self, StopToken};
use assetq_core::runner::{self, RunError, Runner, RunnerSettings, SessionStats};
use assetq_core::site::{BackgroundTransfers, CurlPageSource, HttpIndexer, HttpPageDriver};
use assetq_core::store::{FailureLog, ProcessedSet, QueueStore, FAILURE_LOG_FILE, HISTORY_FILE};
use std::path::{Path, PathBuf};

use crate::cli::{control_socket, download_dir};

#[derive(Debug, Clone, Default)]
pub struct SessionArgs {
    pub site: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub limit: Option<usize>,
    pub reindex: bool,
}

/// Persisted state for one site and download directory.
pub(super) struct Stores {
    pub queue: QueueStore,
    pub processed: ProcessedSet,
    pub failures: FailureLog,
}

impl Stores {
    pub fn open(site: &str, download_dir: &Path) -> Result<Self> {
        Ok(Self {
            queue: QueueStore::new(QueueStore::default_path(site)?),
            processed: ProcessedSet::open(download_dir.join(HISTORY_FILE))?,
            failures: FailureLog::new(download_dir.join(FAILURE_LOG_FILE)),
        })
    }
}

pub async fn run_session(cfg: &AssetqConfig, args: SessionArgs) -> Result<()> {
    let (line, result) = conclude(session(cfg, args).await);
    println!("{}", line);
    result
}

/// Summary line for any way a session ended, plus the command result.
fn conclude(outcome: Result<SessionStats, RunError>) -> (String, Result<()>) {
    match outcome {
        Ok(stats) => (format!("Session complete. {}", stats), Ok(())),
        Err(err) => (format!("Session complete. {}", err.stats), Err(err.error)),
    }
}

async fn session(cfg: &AssetqConfig, args: SessionArgs) -> Result<SessionStats, RunError> {
    let fail = |error: anyhow::Error| RunError::new(SessionStats::default(), error);

    let (site, profile) = cfg.site(args.site.as_deref()).map_err(fail)?;
    let download_dir = download_dir::resolve(args.download_dir.clone()).map_err(fail)?;
    println!("Site: {}  Download path: {}", site, download_dir.display());

    let stop = StopToken::new();
    spawn_interrupt_handler(stop.clone());
    let socket_path = control::default_control_socket_path().ok();
    if let Some(path) = &socket_path {
        match control_socket::spawn_control_listener(stop.clone(), path) {
            Ok(_) => tracing::debug!(path = %path.display(), "control socket listening"),
            Err(e) => tracing::warn!("control socket unavailable: {:#}", e),
        }
    }

    let job = SessionJob {
        site: site.to_string(),
        profile: profile.clone(),
        runner: cfg.runner.clone(),
        download_dir,
        limit: args.limit,
        reindex: args.reindex,
    };
    let outcome = tokio::task::spawn_blocking(move || job.run(&stop)).await;

    if let Some(path) = &socket_path {
        let _ = std::fs::remove_file(path);
    }
    outcome.context("session task panicked").map_err(fail)?
}

/// First Ctrl-C requests a stop after the current asset; a second one exits.
fn spawn_interrupt_handler(stop: StopToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        println!("\nStop requested; finishing current asset. Press Ctrl-C again to quit now.");
        stop.request_stop();
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("assetq: interrupted");
            std::process::exit(130);
        }
    });
}

struct SessionJob {
    site: String,
    profile: SiteProfile,
    runner: RunnerConfig,
    download_dir: PathBuf,
    limit: Option<usize>,
    reindex: bool,
}

impl SessionJob {
    fn run(self, stop: &StopToken) -> Result<SessionStats, RunError> {
        let fail = |error: anyhow::Error| RunError::new(SessionStats::default(), error);

        let mut stores = Stores::open(&self.site, &self.download_dir).map_err(fail)?;
        tracing::info!(
            processed = stores.processed.len(),
            "loaded download history from {}",
            stores.processed.path().display()
        );

        let mut indexer = HttpIndexer::new(CurlPageSource::new(), &self.profile).map_err(fail)?;
        let mut queue = if self.reindex {
            runner::build_queue(&stores.queue, &stores.processed, &mut indexer, stop)
        } else {
            runner::initialize(&stores.queue, &stores.processed, &mut indexer, stop)
        }
        .map_err(fail)?;

        if queue.is_empty() {
            println!("Nothing to do: every listed asset is already downloaded.");
            return Ok(SessionStats::default());
        }
        println!("{} assets queued.", queue.len());

        let gate = CapacityGate::new(&self.download_dir, &self.runner.incomplete_suffix);
        let transfers =
            BackgroundTransfers::new(&self.download_dir, &self.runner.incomplete_suffix);
        let mut driver = HttpPageDriver::new(CurlPageSource::new(), transfers, &self.profile)
            .map_err(fail)?;
        let mut settings = RunnerSettings::from_config(&self.runner);
        settings.item_limit = self.limit;

        let result = Runner::new(
            &stores.queue,
            &mut stores.processed,
            &stores.failures,
            &gate,
            settings,
            stop.clone(),
        )
        .run(&mut queue, &mut driver);

        println!("Waiting for final file transfers to finalize...");
        let drained = runner::drain(&gate, self.runner.drain_poll(), self.runner.settle());
        match (result, drained) {
            (Ok(stats), Ok(())) => Ok(stats),
            (Ok(stats), Err(e)) => Err(RunError::new(stats, e)),
            (Err(e), drained) => {
                if let Err(d) = drained {
                    tracing::warn!("drain after failed session: {:#}", d);
                }
                Err(e)
            }
        }
    }
}
