//! Session stop control: a shared stop token and the control socket location.
//!
//! The runner only looks at the token between items, so a stop request never
//! interrupts a page interaction that is already underway. Signal sources
//! (Ctrl-C, `assetq stop` via the control socket) just flip the flag.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable, thread-safe stop flag. All clones observe the same request.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the session to stop at the next iteration boundary. Idempotent.
    pub fn request_stop(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            tracing::warn!("stop requested; finishing current item then draining");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Parses one control-socket line. Returns true for a stop request.
pub fn is_stop_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "stop" | "cancel")
}

/// Default path for the control socket (same XDG state dir as the log).
pub fn default_control_socket_path() -> anyhow::Result<PathBuf> {
    Ok(crate::config::state_dir()?.join("control.sock"))
}
