//! HTTP API consumed by the mini app and the admin page.
//!
//! Reading the catalog is public. Every mutating route re-checks the
//! admin password and user id through the [`AdminGate`](crate::auth::AdminGate)
//! before the store is touched.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use routes::{
    add_category_handler, add_post_handler, auth_handler, categories_handler,
    delete_category_handler, delete_post_handler, health_handler, rename_category_handler,
    update_post_handler,
};

/// Builds the API router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/categories/add", post(add_category_handler))
        .route("/api/categories/{category}", delete(delete_category_handler))
        .route(
            "/api/categories/{category}/rename",
            put(rename_category_handler),
        )
        .route("/api/categories/{category}/posts", post(add_post_handler))
        .route(
            "/api/categories/{category}/posts/{index}",
            put(update_post_handler).delete(delete_post_handler),
        )
        .route("/api/admin/auth", post(auth_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API on `0.0.0.0:<port>` until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
