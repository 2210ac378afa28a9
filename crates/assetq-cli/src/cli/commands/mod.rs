//! CLI command handlers. Each command is in its own file.

mod index;
mod run;
mod status;
mod stop;

pub use index::run_index;
pub use run::{run_session, SessionArgs};
pub use status::run_status;
pub use stop::run_stop;
