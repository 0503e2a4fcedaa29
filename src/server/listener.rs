use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::Config;
use crate::files::FilesystemHandler;
use crate::http::connection::Connection;
use crate::http::dispatcher::Dispatcher;

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Builds the dispatcher the server runs with: `GET` served from the
/// document root.
pub fn build_dispatcher(cfg: &Config) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.set_handler(
        FilesystemHandler::METHOD,
        FilesystemHandler::new(cfg.static_files.root.clone()),
    );
    dispatcher
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, Arc::new(build_dispatcher(cfg)), cfg).await
}

/// Accepts connections forever, handing each to its own task.
///
/// At most `server.workers` connections are served at once. When all are
/// busy the loop stops accepting until one finishes.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    cfg: &Config,
) -> anyhow::Result<()> {
    let workers = Arc::new(Semaphore::new(cfg.server.workers));
    let max_request_bytes = cfg.server.max_request_bytes;

    loop {
        let permit = Arc::clone(&workers).acquire_owned().await?;
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                // Aborted handshakes and fd exhaustion pass; keep serving.
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let conn = Connection::new(socket, dispatcher).with_max_request_bytes(max_request_bytes);
            match conn.run().await {
                Ok(served) => info!(peer = %peer, served, "Connection closed"),
                Err(e) => tracing::error!("Connection error from {}: {:#}", peer, e),
            }
            drop(permit);
        });
    }
}
