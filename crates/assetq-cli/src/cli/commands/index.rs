//! `assetq index` – rebuild the persisted queue from the site listing.

use anyhow::Result;
use assetq_core::config::AssetqConfig;
use assetq_core::control::StopToken;
use assetq_core::runner;
use assetq_core::site::{CurlPageSource, HttpIndexer};
use std::path::PathBuf;

use super::run::Stores;
use crate::cli::download_dir;

pub async fn run_index(
    cfg: &AssetqConfig,
    site: Option<&str>,
    download_dir: Option<PathBuf>,
) -> Result<()> {
    let (site, profile) = cfg.site(site)?;
    let download_dir = download_dir::resolve(download_dir)?;
    let site = site.to_string();
    let profile = profile.clone();

    let (queued, path) = tokio::task::spawn_blocking(move || -> Result<(usize, PathBuf)> {
        let stores = Stores::open(&site, &download_dir)?;
        let mut indexer = HttpIndexer::new(CurlPageSource::new(), &profile)?;
        let queue =
            runner::build_queue(&stores.queue, &stores.processed, &mut indexer, &StopToken::new())?;
        Ok((queue.len(), stores.queue.path().to_path_buf()))
    })
    .await??;

    println!("{} assets queued in {}", queued, path.display());
    Ok(())
}
