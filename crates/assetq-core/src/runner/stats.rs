use std::fmt;

/// Counters for one session, returned by the runner instead of kept globally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Assets with at least one triggered download.
    pub success: u32,
    /// Assets with no links or a page error.
    pub failed: u32,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success: {} | Failed: {}", self.success, self.failed)
    }
}

/// Fatal error that ended a session early, with the counters reached so far.
#[derive(Debug, thiserror::Error)]
#[error("session aborted ({stats}): {error:#}")]
pub struct RunError {
    pub stats: SessionStats,
    pub error: anyhow::Error,
}

impl RunError {
    pub fn new(stats: SessionStats, error: anyhow::Error) -> Self {
        Self { stats, error }
    }
}
