//! Server setup and lifecycle

use std::future::IntoFuture;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::Error;
use crate::config::HarnessConfig;
use crate::routes;
use crate::state::AppState;

/// Build the app from `config`, bind and serve until shutdown.
///
/// # Errors
///
/// Returns an error if the app cannot be built or bound, if serving fails,
/// or [`Error::FatalShutdown`] after a fatal-shutdown request.
pub async fn run_server(config: HarnessConfig) -> Result<(), Error> {
    let state = AppState::new(config).await?;
    let listener = TcpListener::bind(&state.config.bind_address).await?;
    info!(
        address = %state.config.bind_address,
        sidecar = %state.client.base_url(),
        "Actor features app listening"
    );
    serve(listener, state).await
}

/// Serve on an already bound listener.
///
/// SIGINT or SIGTERM drains in-flight requests for at most
/// `shutdown_grace`. A raised `fatal` notification ends serving at once.
///
/// # Errors
///
/// Returns [`Error::FatalShutdown`] after a fatal-shutdown request, or the
/// I/O error that stopped the server.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), Error> {
    let grace = state.config.shutdown_grace;
    let fatal = state.fatal.clone();
    let drain = Arc::new(Notify::new());

    let app = routes::create_router(state);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let drain = drain.clone();
            async move { drain.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        signal = termination_signal() => {
            info!(signal, "Shutdown signal received, draining requests");
            drain.notify_one();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(grace_ms = grace.as_millis(), "Shutdown grace window elapsed"),
            }
        }
        () = fatal.notified() => {
            error!("Fatal shutdown requested");
            return Err(Error::FatalShutdown);
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves with the name of the first termination signal received.
async fn termination_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                () = interrupt() => "SIGINT",
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                interrupt().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await;
        "SIGINT"
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
