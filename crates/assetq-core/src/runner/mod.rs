//! Resumable, capacity-gated dispatch over a queue of asset identifiers.
//!
//! Session flow: `initialize` (load the pending queue, or index the site when
//! it is empty) → `Runner::run` (pop, process, record, persist, stagger) →
//! `drain` (wait until the download directory has no incomplete files).
//! Processing is strictly one item at a time; only the external download
//! manager runs transfers concurrently.

mod dispatch;
mod drain;
mod initialize;
mod item;
mod pacing;
mod stats;

pub use dispatch::{Runner, RunnerSettings};
pub use drain::drain;
pub use initialize::{build_queue, initialize};
pub use item::{ItemOutcome, LinkFailure, PageDriver, SiteIndexer};
pub use pacing::jittered;
pub use stats::{RunError, SessionStats};
