use axum::{
    routing::{get, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::SharedStore;

pub mod assets;
pub mod error;
pub mod routes;

#[cfg(test)]
mod tests;

/// Server state
pub struct AppState {
    pub store: SharedStore,
    pub static_dir: PathBuf,
}

/// Build the full application router.
///
/// Items are reachable under both `/items` and `/api/todos`; id routes also
/// accept a trailing slash.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new();
    for base in ["/items", "/api/todos"] {
        let by_id = put(routes::update_item).delete(routes::delete_item);
        app = app
            .route(base, get(routes::list_items).post(routes::create_item))
            .route(&format!("{base}/{{id}}"), by_id.clone())
            .route(&format!("{base}/{{id}}/"), by_id);
    }

    app.route("/health", get(routes::health))
        .merge(assets::routes(&state.static_dir))
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn start_server(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health: http://localhost:{}/health", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
