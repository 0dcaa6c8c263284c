//! Router construction and serving.

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::gate::Gate;

/// Build the router for `gate`.
pub fn router(gate: Arc<Gate>) -> Router {
    Router::new()
        .route("/api/adduser/:user/:ttl", post(handlers::add_user))
        .route("/api/delete/:user", delete(handlers::delete_user))
        .route("/api/authenticate/:user", get(handlers::authenticate))
        .route(
            "/api/remove-invalid-records",
            post(handlers::remove_invalid_records),
        )
        .route("/api/getcode/:user", get(handlers::get_code))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(gate)
}

/// Serve `gate` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Arguments
/// * `listener` - Bound listener; bind to port 0 in tests
/// * `gate` - The gate to serve
/// * `shutdown` - Resolves when the server should stop accepting connections
pub async fn serve<F>(listener: TcpListener, gate: Arc<Gate>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Gate listening on http://{}", addr);

    axum::serve(listener, router(gate))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Gate server stopped");
    Ok(())
}
