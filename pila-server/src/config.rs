use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::expiration_manager::REAP_INTERVAL;

#[derive(Debug)]
pub struct Config {
    /// Address the HTTP server binds to. Port 0 picks an ephemeral port,
    /// reported through `port_tx`.
    pub addr: SocketAddr,
    /// Root directory for the persistent collections.
    pub storage_path: String,
    /// Time between expiry scans.
    pub reap_interval: Duration,
    /// Receives the actually-bound port once the listener is up.
    pub port_tx: Option<oneshot::Sender<u16>>,
}

impl Config {
    #[must_use]
    pub fn new(addr: SocketAddr, storage_path: impl Into<String>) -> Self {
        Self {
            addr,
            storage_path: storage_path.into(),
            reap_interval: REAP_INTERVAL,
            port_tx: None,
        }
    }

    pub fn sanitize(&self) -> anyhow::Result<()> {
        let storage_path = std::path::Path::new(&self.storage_path);
        if !storage_path.exists()
            && std::fs::DirBuilder::new()
                .recursive(true)
                .create(storage_path)
                .is_err()
        {
            return Err(anyhow::Error::msg("Failed to create storage directory"));
        }

        if !storage_path.is_dir() {
            return Err(anyhow::Error::msg(
                "The storage path provided is not a directory",
            ));
        }

        Ok(())
    }
}
