use std::future::Future;
use std::time::Duration;

use pila_sdk::Client;
use tokio::sync::oneshot;

/// Start a server on an ephemeral port with a fast expiry scan and return a
/// client pointed at it.
pub async fn setup(
    storage_path: &str,
    shutdown_signal: impl Future<Output = ()> + Send + Sync + 'static,
) -> Client {
    let (port_tx, port_rx) = oneshot::channel();

    let mut config = pila_system::Config::new("127.0.0.1:0".parse().unwrap(), storage_path);
    config.reap_interval = Duration::from_millis(100);
    config.port_tx = Some(port_tx);

    tokio::spawn(async move {
        if let Err(err) = pila_system::start(config, shutdown_signal).await {
            panic!("server error: {}", err);
        }
    });

    let port = port_rx.await.unwrap();

    Client::new(format!("http://127.0.0.1:{port}"))
}

#[allow(dead_code)]
pub async fn setup_tempdir() -> (tempfile::TempDir, Client) {
    let dir = tempfile::tempdir().unwrap();
    let sdk = setup(dir.path().to_str().unwrap(), std::future::pending()).await;
    (dir, sdk)
}
