//! Background transfers that follow the incomplete-file naming convention.
//!
//! `start` skips links whose `<dir>/<name>` already exists. Otherwise it
//! creates `<dir>/<name><suffix>` before returning, so the capacity
//! gate sees the transfer immediately. A detached thread then streams the body
//! into that file and renames it to `<dir>/<name>` on success, or removes it on
//! failure. Nothing joins these threads; completion is observed only through
//! the directory listing.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What `TransferStarter::start` did with a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStart {
    /// A transfer is now under way.
    Started,
    /// The final file is already in the download directory; nothing was fetched.
    AlreadyPresent,
}

/// Starts a download of `url` into the download directory as `file_name`.
pub trait TransferStarter {
    /// Returns once the transfer is under way. Errors mean it never started.
    fn start(&self, url: &str, file_name: &str) -> Result<TransferStart>;
}

impl<T: TransferStarter + ?Sized> TransferStarter for &T {
    fn start(&self, url: &str, file_name: &str) -> Result<TransferStart> {
        (**self).start(url, file_name)
    }
}

#[derive(Debug, Clone)]
pub struct BackgroundTransfers {
    dir: PathBuf,
    suffix: String,
}

impl BackgroundTransfers {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    fn temp_path(&self, final_path: &Path) -> PathBuf {
        let mut o = final_path.as_os_str().to_owned();
        o.push(&self.suffix);
        PathBuf::from(o)
    }
}

impl TransferStarter for BackgroundTransfers {
    fn start(&self, url: &str, file_name: &str) -> Result<TransferStart> {
        let final_path = self.dir.join(file_name);
        if final_path.exists() {
            tracing::info!(file = %final_path.display(), "skipping: already downloaded");
            return Ok(TransferStart::AlreadyPresent);
        }
        let temp_path = self.temp_path(&final_path);
        if temp_path.exists() {
            anyhow::bail!("transfer already in progress: {}", temp_path.display());
        }
        let file = File::create(&temp_path)
            .with_context(|| format!("create temp file: {}", temp_path.display()))?;

        let url = url.to_string();
        let spawned = std::thread::Builder::new()
            .name(format!("transfer-{}", file_name))
            .spawn({
                let temp_path = temp_path.clone();
                move || match download_to(&url, file, &temp_path, &final_path) {
                    Ok(bytes) => {
                        tracing::info!(file = %final_path.display(), bytes, "transfer complete")
                    }
                    Err(e) => {
                        let _ = std::fs::remove_file(&temp_path);
                        tracing::warn!(url = %url, "transfer failed: {:#}", e);
                    }
                }
            });
        if let Err(e) = spawned {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e).context("spawn transfer thread");
        }
        tracing::debug!(file = %temp_path.display(), "transfer started");
        Ok(TransferStart::Started)
    }
}

/// Streams `url` into `file` (open at `temp_path`), then renames it to `final_path`.
fn download_to(url: &str, mut file: File, temp_path: &Path, final_path: &Path) -> Result<u64> {
    let mut written: u64 = 0;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(Duration::from_secs(3600))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        let performed = transfer.perform();
        drop(transfer);
        if let Some(e) = write_error.take() {
            return Err(e).with_context(|| format!("write {}", temp_path.display()));
        }
        performed.context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    file.sync_all().context("sync download")?;
    drop(file);
    std::fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            temp_path.display(),
            final_path.display()
        )
    })?;
    Ok(written)
}
