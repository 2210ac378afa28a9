//! `assetq stop` – ask the running session to stop after its current asset.

use anyhow::Result;
use assetq_core::control::default_control_socket_path;

use crate::cli::control_socket;

pub async fn run_stop() -> Result<()> {
    let path = default_control_socket_path()?;
    if control_socket::send_stop(&path).await? {
        println!("Stop sent; the session ends after its current asset.");
    } else {
        println!("No running session.");
    }
    Ok(())
}
