pub mod error;
pub mod routes;
pub mod store;

use std::sync::Arc;

use almanac_core::config::Config;
use anyhow::{Context, anyhow};
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::store::{EventStore, SharedStore};

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Runs a store call on the blocking pool.
    pub async fn blocking<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn EventStore) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|err| anyhow!("store task failed: {err}"))?;
        Ok(result?)
    }
}

/// API routes wrapped in CORS for a single origin. Any `OPTIONS` request
/// is answered with 200 before routing.
pub fn build_router(state: AppState, allowed_origin: &str) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("invalid allowed origin: {allowed_origin}"))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(routes::router()
        .with_state(state)
        .layer(middleware::from_fn(answer_options))
        .layer(cors))
}

async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

/// Opens the store, binds, and serves until SIGINT or SIGTERM.
#[tracing::instrument(skip_all, fields(port = cfg.server.port))]
pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    let store_cfg = cfg.clone();
    let store = tokio::task::spawn_blocking(move || store::open_store(&store_cfg))
        .await
        .context("store setup task failed")??;

    let app = build_router(AppState::new(store), &cfg.server.allowed_origin)?;

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "almanac server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            wait_for_shutdown_signal().await;
            warn!("received shutdown signal; draining connections");
        })
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "failed to register SIGINT handler; falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "failed to register SIGTERM handler; falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed waiting for ctrl_c signal");
    }
}
