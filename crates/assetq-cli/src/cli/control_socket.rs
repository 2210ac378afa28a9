//! Control socket: server (during `assetq run`) and client (for `assetq stop`).
//! Protocol: one command per line; `stop` (or `cancel`) requests a stop.

use anyhow::Result;
use assetq_core::control::{is_stop_command, StopToken};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Spawns a task that listens on `path` and requests a stop for each `stop`
/// line. Other lines are ignored.
pub fn spawn_control_listener(
    stop: StopToken,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let stop = stop.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            if is_stop_command(&line) {
                                println!("Stop requested; finishing current asset.");
                                stop.request_stop();
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends "stop\n" to the control socket. Returns false if no session is listening.
pub async fn send_stop(socket_path: &Path) -> Result<bool> {
    if !socket_path.exists() {
        return Ok(false);
    }
    let mut stream = match tokio::net::UnixStream::connect(socket_path).await {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    tokio::io::AsyncWriteExt::write_all(&mut stream, b"stop\n").await?;
    Ok(true)
}
