//! Server bootstrap.

use anyhow::{Context, Result};
use libdomain_sweep::Prober;
use std::{future::Future, io, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::routes::create_router;
use crate::state::AppContext;

pub async fn serve(config: Config) -> Result<()> {
    let prober = Prober::with_config(config.probe.to_probe_config())?;
    let state = Arc::new(AppContext::new(prober, &config));
    let app = create_router(state.clone(), &config.server.cors_origins);

    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    info!(
        addr = %listener.local_addr()?,
        extensions = ?state.extensions,
        methods = ?state.prober.config().methods,
        "listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
    .await?;

    Ok(())
}

/// Resolves once `signal` fires. If the handler cannot be installed the
/// server keeps running instead of stopping straight away.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            warn!(error = %e, "failed to listen for ctrl-c, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
