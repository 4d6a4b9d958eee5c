//! HTTP server lifecycle
//!
//! [`RelayServer::start`] binds the listen address and serves on a background
//! task. The returned [`RunningServer`] reports the bound address and is used
//! to stop the server and wait for it to finish.

use axum::{extract::ConnectInfo, http::Request, Router};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::{error, info, warn};

use config_manager::{ConfigurationError, HttpConfig};

use crate::errors::ServerError;
use crate::tls;

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// Starts HTTP servers.
pub struct RelayServer;

impl RelayServer {
    /// Binds the configured address and starts serving `router`, over TLS
    /// when `http.tls` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address is invalid, the TLS material
    /// cannot be loaded, or the address cannot be bound.
    pub async fn start(http: &HttpConfig, router: Router) -> Result<RunningServer, ServerError> {
        let address = http.listen_address()?;

        let acceptor = if http.tls {
            let cert = http
                .tls_cert
                .as_deref()
                .ok_or_else(|| ConfigurationError::RequiredConfigMissing {
                    key: "http.tls_cert".to_string(),
                })?;
            let key = http
                .tls_key
                .as_deref()
                .ok_or_else(|| ConfigurationError::RequiredConfigMissing {
                    key: "http.tls_key".to_string(),
                })?;
            Some(tls::build_tls_acceptor(cert, key).await?)
        } else {
            None
        };

        Self::start_on(address.as_str(), router, acceptor).await
    }

    /// Binds `address` and starts serving `router`. Host names are resolved
    /// and the first address that binds is used.
    ///
    /// The socket is bound and accepting connections when this returns.
    pub async fn start_on<A>(
        address: A,
        router: Router,
        acceptor: Option<TlsAcceptor>,
    ) -> Result<RunningServer, ServerError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let bind_error = |source: std::io::Error| ServerError::Bind {
            address: address.to_string(),
            source,
        };
        let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = match acceptor {
            Some(acceptor) => {
                info!(address = %local_addr, "Listening for webhooks (TLS)");
                tokio::spawn(serve_tls(listener, router, acceptor, shutdown_rx))
            }
            None => {
                info!(address = %local_addr, "Listening for webhooks");
                tokio::spawn(serve_plain(listener, router, shutdown_rx))
            }
        };

        Ok(RunningServer {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Handle to a server started by [`RelayServer`].
///
/// Dropping the handle also stops the server.
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<anyhow::Result<()>>>,
}

impl RunningServer {
    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the server to stop accepting connections.
    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }

    /// Waits for the server task to finish.
    ///
    /// Returns immediately if the task has already been waited for.
    pub async fn wait(&mut self) -> anyhow::Result<()> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };
        let result = task.await;
        self.task = None;
        result.map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?
    }

    /// Shuts the server down and waits for it to finish.
    pub async fn stop(mut self) -> anyhow::Result<()> {
        self.shutdown();
        self.wait().await
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown.await;
    })
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn serve_tls(
    listener: TcpListener,
    router: Router,
    acceptor: TlsAcceptor,
    mut shutdown: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let router = router.clone();
        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(tls_stream) => tls_stream,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let service = router.map_request(move |mut request: Request<Incoming>| {
                request.extensions_mut().insert(ConnectInfo(peer));
                request
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), TowerToHyperService::new(service))
                .await
            {
                error!(peer = %peer, error = %e, "TLS connection error");
            }
        });
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (CTRL+C or SIGTERM)
///
/// This function waits for either:
/// - CTRL+C (SIGINT) on all platforms
/// - SIGTERM on Unix platforms
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
