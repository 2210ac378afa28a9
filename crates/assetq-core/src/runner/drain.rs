use anyhow::Result;
use std::time::Duration;

use crate::capacity::InFlight;

/// Blocks until the gate reports no in-flight downloads, polling every `poll`,
/// then waits `settle` so the last rename has landed before teardown.
pub fn drain(gate: &dyn InFlight, poll: Duration, settle: Duration) -> Result<()> {
    loop {
        let active = gate.in_flight()?;
        if active == 0 {
            break;
        }
        tracing::info!(active, "waiting for final file transfers to finalize");
        std::thread::sleep(poll);
    }
    if !settle.is_zero() {
        std::thread::sleep(settle);
    }
    Ok(())
}
