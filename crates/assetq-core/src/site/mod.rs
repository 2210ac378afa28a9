//! HTTP implementations of the runner's collaborators.
//!
//! `HttpIndexer` walks a site's listing pages and extracts asset ids;
//! `HttpPageDriver` loads an asset's detail page, filters its download links by
//! label, and hands accepted links to `BackgroundTransfers`, which downloads
//! each one to `<name><suffix>` on its own thread and renames it when done.
//! The runner never talks to the transfers directly: it only sees the
//! suffixed files through the capacity gate.

mod driver;
mod fetch;
mod filename;
mod index;
mod links;
mod transfer;

pub use driver::HttpPageDriver;
pub use fetch::{CurlPageSource, FetchError, PageSource};
pub use filename::{filename_for_link, sanitize_filename};
pub use index::HttpIndexer;
pub use links::{extract_ids, extract_links, LabelFilter, LinkCandidate};
pub use transfer::{BackgroundTransfers, TransferStart, TransferStarter};
