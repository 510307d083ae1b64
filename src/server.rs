//! HTTP server lifecycle: bind, serve, and signal-driven graceful shutdown.

use crate::app::App;
use crate::auth::load_keys;
use crate::billing::{PolarClient, SubscriptionChecker};
use crate::database::Database;
use crate::error::BootstrapError;
use crate::routes::{api_routes, build_router};
use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// Time connections get to flush their 503 after the forced cutoff.
const CUTOFF_FLUSH: Duration = Duration::from_secs(1);
/// Upper bound on closing the database once shutdown was forced.
const FORCED_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Server {
    app: App,
    router: Router,
    listener: TcpListener,
    cutoff: CancellationToken,
}

impl Server {
    /// Load auth keys, install middleware and routes, bind `0.0.0.0:<server.port>`.
    pub async fn new(app: App) -> Result<Self, BootstrapError> {
        Self::with_api(app, api_routes()).await
    }

    /// Like [`Server::new`] with caller-supplied endpoints in the protected `/api` group.
    pub async fn with_api(app: App, api: Router) -> Result<Self, BootstrapError> {
        let keys = Arc::new(load_keys(&app.config.auth.jwks_url).await?);

        let billing = if app.config.billing.subscription_required {
            let client: Arc<dyn SubscriptionChecker> = Arc::new(PolarClient::new(&app.config.billing)?);
            Some(client)
        } else {
            None
        };

        let cutoff = CancellationToken::new();
        let router = build_router(keys, billing, api, cutoff.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], app.config.server.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BootstrapError::Bind { addr, source })?;

        Ok(Server {
            app,
            router,
            listener,
            cutoff,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Serve until SIGINT or SIGTERM, then drain and close the database.
    /// A second signal during the drain cancels the requests still in flight.
    pub async fn run(self) -> Result<(), BootstrapError> {
        self.serve(shutdown_signal(), shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then shut down as [`Server::run`] does.
    pub async fn run_until<F>(self, signal: F) -> Result<(), BootstrapError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.serve(signal, std::future::pending()).await
    }

    async fn serve<S, F>(self, signal: S, force: F) -> Result<(), BootstrapError>
    where
        S: Future<Output = ()> + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let Server {
            app,
            router,
            listener,
            cutoff,
        } = self;
        let port = listener
            .local_addr()
            .map(|a| a.port())
            .unwrap_or(app.config.server.port);

        let (drain_tx, drain_rx) = oneshot::channel::<()>();
        let serving = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = drain_rx.await;
                })
                .await
        });
        tracing::info!(port, "Starting server");

        let watcher = tokio::spawn(shutdown_watcher(ShutdownWatch {
            signal,
            force,
            drain: drain_tx,
            cutoff,
            serving,
            db: app.db.clone(),
            grace: Duration::from_secs(app.config.server.graceful_shutdown_sec),
        }));

        match watcher.await {
            Ok(result) => result,
            Err(e) => Err(BootstrapError::Serve(io::Error::other(e.to_string()))),
        }
    }
}

struct ShutdownWatch<S, F> {
    signal: S,
    force: F,
    drain: oneshot::Sender<()>,
    cutoff: CancellationToken,
    serving: JoinHandle<io::Result<()>>,
    db: Arc<dyn Database>,
    grace: Duration,
}

/// Waits for the shutdown signal, drains in-flight requests within the grace period,
/// then closes the database. Past the deadline (or on a second signal) the remaining
/// handlers are cancelled before the database goes away. The database is closed exactly
/// once on every path.
async fn shutdown_watcher<S, F>(watch: ShutdownWatch<S, F>) -> Result<(), BootstrapError>
where
    S: Future<Output = ()> + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let ShutdownWatch {
        signal,
        force,
        drain,
        cutoff,
        mut serving,
        db,
        grace,
    } = watch;

    let stopped_early = tokio::select! {
        res = &mut serving => Some(res),
        _ = signal => None,
    };

    let (result, forced) = match stopped_early {
        Some(res) => {
            tracing::error!("server stopped before a shutdown signal");
            (serve_outcome(res), false)
        }
        None => {
            tracing::info!("shutting down gracefully, press Ctrl+C again to force");
            let _ = drain.send(());
            let drained = tokio::select! {
                res = tokio::time::timeout(grace, &mut serving) => match res {
                    Ok(res) => Some(serve_outcome(res)),
                    Err(_) => {
                        tracing::warn!(grace_secs = grace.as_secs(), "Server forced to shutdown: graceful deadline exceeded");
                        None
                    }
                },
                _ = force => {
                    tracing::warn!("Server forced to shutdown: second signal received");
                    None
                }
            };
            match drained {
                Some(result) => (result, false),
                None => {
                    cutoff.cancel();
                    if tokio::time::timeout(CUTOFF_FLUSH, &mut serving).await.is_err() {
                        serving.abort();
                    }
                    (Ok(()), true)
                }
            }
        }
    };

    let closed = if forced {
        tokio::time::timeout(FORCED_CLOSE_TIMEOUT, db.close())
            .await
            .unwrap_or_else(|_| {
                tracing::warn!("database close timed out after forced shutdown");
                Ok(())
            })
    } else {
        db.close().await
    };
    if let Err(e) = closed {
        tracing::error!(error = %e, "failed to close database");
    }
    tracing::info!("Server exiting");
    result
}

fn serve_outcome(res: Result<io::Result<()>, JoinError>) -> Result<(), BootstrapError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BootstrapError::Serve(e)),
        Err(e) => Err(BootstrapError::Serve(io::Error::other(e.to_string()))),
    }
}

/// Resolves on the first SIGINT (Ctrl+C) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
