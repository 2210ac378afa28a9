//! Durable session state.
//!
//! The pending queue, the processed history, the failure log, and the saved
//! download path all live in plain files so an interrupted session can pick up
//! where it stopped without re-indexing or re-downloading.

mod failures;
mod history;
mod queue;
mod session;

pub use failures::{FailureLog, FailureRecord};
pub use history::ProcessedSet;
pub use queue::QueueStore;
pub use session::SessionFile;

/// File name of the processed history inside the download directory.
pub const HISTORY_FILE: &str = "download_history.txt";
/// File name of the failure log inside the download directory.
pub const FAILURE_LOG_FILE: &str = "failed_downloads.md";
