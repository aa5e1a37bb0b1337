//! HTTP surface for the summarizer.
//!
//! - `GET /` liveness
//! - `POST /summarize` collected summary as JSON
//! - `POST /summarize/stream` summary forwarded as plain text while it arrives

pub mod routes;
pub mod state;

pub use routes::{create_router, ApiError, SummarizeResponse};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Serve until `shutdown_signal` completes, then drain in-flight requests.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown_signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app: Router = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Summarizer listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
