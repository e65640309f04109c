//! HTTP server.
//!
//! Serves a [`Dispatcher`] over HTTP/1.1 with hyper. The accept loop runs
//! until the [`ShutdownSignal`] fires; open connections then get up to
//! `server.shutdown_timeout_secs` to finish.
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_server::{App, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::builder().build()?;
//!     Server::from_app(&app).serve().await?;
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use hearth_config::ServerConfig;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The Hearth HTTP server.
#[derive(Debug, Clone)]
pub struct Server {
    dispatcher: Dispatcher,
    config: ServerConfig,
}

impl Server {
    /// Creates a server for a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Creates a server for a built application.
    #[must_use]
    pub fn from_app(app: &App) -> Self {
        Self::new(app.dispatcher().clone(), app.config().server.clone())
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until ctrl-c or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn serve_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve_listener(listener, shutdown).await;
        Ok(())
    }

    /// Serves on an already-bound listener until `shutdown` fires.
    pub async fn serve_listener(self, listener: TcpListener, shutdown: ShutdownSignal) {
        match listener.local_addr() {
            Ok(addr) => info!(%addr, "server listening"),
            Err(e) => warn!(error = %e, "server listening on unknown address"),
        }

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let dispatcher = self.dispatcher.clone();
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            serve_connection(dispatcher, stream, remote, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = Duration::from_secs(self.config.shutdown_timeout_secs);
        info!(
            open = tracker.active_connections(),
            timeout_secs = timeout.as_secs(),
            "waiting for open connections"
        );
        tokio::select! {
            () = tracker.wait_idle() => info!("all connections closed"),
            () = tokio::time::sleep(timeout) => warn!(
                open = tracker.active_connections(),
                "shutdown timeout reached"
            ),
        }
        info!("server stopped");
    }
}

async fn serve_connection(
    dispatcher: Dispatcher,
    stream: TcpStream,
    remote: SocketAddr,
    shutdown: ShutdownSignal,
) {
    let service = service_fn(move |request: Request<Incoming>| {
        let dispatcher = dispatcher.clone();
        async move { dispatcher.handle(request).await }
    });

    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                debug!(%remote, error = %e, "connection ended with error");
            }
        }
        () = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            if let Err(e) = conn.await {
                debug!(%remote, error = %e, "connection ended with error during shutdown");
            }
        }
    }
}
