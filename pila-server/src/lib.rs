#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::pedantic)]
#![deny(clippy::get_unwrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod core;
mod error;
mod expiration_manager;
mod response;
mod router;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use config::Config;
pub use self::core::{Core, PoppedTask};
pub use error::{Error, ErrorType};
pub use expiration_manager::clock::{Clock, SystemClock};
pub use expiration_manager::lease::LeaseKey;
pub use expiration_manager::{ExpirationManager, REAP_INTERVAL};
pub use router::RouterService;

use tower::make::Shared;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

pub async fn shutdown_signal() {
    // Wait for the CTRL+C signal
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}

pub async fn start(
    mut config: Config,
    shutdown_signal: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    config.sanitize()?;

    let port_tx = config.port_tx.take();

    let core = Arc::new(Core::open(
        &config.storage_path,
        SystemClock::new(),
        config.reap_interval,
    )?);

    let expiration = core.expiration();
    tokio::spawn(async move {
        expiration.start().await;
    });

    let service = ServiceBuilder::new()
        .concurrency_limit(1000)
        .timeout(Duration::from_secs(30))
        .layer(RequestBodyLimitLayer::new(1024 * 16))
        .layer(CorsLayer::permissive())
        .service(RouterService::new(Arc::clone(&core)));

    let server = hyper::Server::bind(&config.addr).serve(Shared::new(service));
    let addr = server.local_addr();

    info!("pila listening on {addr}");
    if let Some(tx) = port_tx {
        let _ = tx.send(addr.port());
    }

    let server = server.with_graceful_shutdown(async {
        shutdown_signal.await;
        info!("Shutdown signal received");
    });

    let result = server.await;
    core.close().await;

    result.map_err(Into::into)
}
