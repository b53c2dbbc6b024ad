//! Port auto-selection and the `server-port.json` lifecycle (§4.8, §6
//! persisted-state layout).

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::net::TcpListener;

use crate::config::PortPreference;

const FALLBACK_RANGE: std::ops::RangeInclusive<u16> = 8080..=8090;
const PORT_FILE: &str = "server-port.json";

#[derive(Debug, Serialize)]
struct PortFile {
    port: u16,
    pid: u32,
    #[serde(rename = "startedAt")]
    started_at: String,
}

/// Try the preferred port first, then fall back through 8080-8090 (§4.8).
pub async fn bind(preference: &PortPreference) -> io::Result<TcpListener> {
    if let PortPreference::Fixed(port) = preference {
        return TcpListener::bind(("0.0.0.0", *port)).await;
    }

    let mut last_err = None;
    for port in FALLBACK_RANGE {
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::other("no port in the fallback range was available")))
}

/// Publish the chosen port for the companion client, written at listen
/// time and removed at shutdown.
pub async fn write_port_file(dir: &Path, port: u16, started_at: &str) -> io::Result<PathBuf> {
    let path = dir.join(PORT_FILE);
    let contents = serde_json::to_vec_pretty(&PortFile {
        port,
        pid: std::process::id(),
        started_at: started_at.to_string(),
    })
    .expect("PortFile always serializes");
    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

pub async fn remove_port_file(path: &Path) {
    let _ = tokio::fs::remove_file(path).await;
}
