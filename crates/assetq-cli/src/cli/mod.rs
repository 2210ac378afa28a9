//! CLI for the assetq download queue runner.

mod commands;
mod control_socket;
mod download_dir;

use anyhow::Result;
use assetq_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_index, run_session, run_status, run_stop, SessionArgs};

/// Top-level CLI for assetq.
#[derive(Debug, Parser)]
#[command(name = "assetq")]
#[command(about = "assetq: resumable, capacity-gated asset download queue", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Index the site if the queue is empty, then download every queued asset.
    Run {
        /// Site profile from config.toml (default: `default_site`).
        #[arg(long)]
        site: Option<String>,
        /// Download directory; remembered for later sessions.
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
        /// Dispatch at most N assets this session.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Discard the persisted queue and index the site again first.
        #[arg(long)]
        reindex: bool,
    },

    /// Index the site now and overwrite the persisted queue.
    Index {
        /// Site profile from config.toml (default: `default_site`).
        #[arg(long)]
        site: Option<String>,
        /// Download directory whose history filters the index.
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Show queue, history, failure, and in-flight counts.
    Status {
        /// Site profile from config.toml (default: `default_site`).
        #[arg(long)]
        site: Option<String>,
    },

    /// Ask a running session to stop after its current asset.
    Stop,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                site,
                download_dir,
                limit,
                reindex,
            } => {
                let args = SessionArgs {
                    site,
                    download_dir,
                    limit,
                    reindex,
                };
                run_session(&cfg, args).await?
            }
            CliCommand::Index { site, download_dir } => {
                run_index(&cfg, site.as_deref(), download_dir).await?
            }
            CliCommand::Status { site } => run_status(&cfg, site.as_deref()).await?,
            CliCommand::Stop => run_stop().await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
