//! MCP HTTP server
//!
//! Exposes the relay over `POST /mcp`. The handler drains the stream fully
//! before replying; clients get exactly one JSON body per request.

mod handler;

pub use handler::{McpRequest, McpResponse};

use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::llm::LlmProvider;

/// Build the MCP router. Non-POST requests to `/mcp` are answered with 405
/// by the method router.
pub fn app(provider: Arc<dyn LlmProvider>) -> Router {
    Router::new()
        .route("/mcp", post(handler::mcp))
        .with_state(provider)
}

/// Bind the listen port and serve until the process is stopped.
pub async fn serve(provider: Arc<dyn LlmProvider>, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("MCP server listening on http://localhost:{port}/mcp");
    axum::serve(listener, app(provider)).await?;
    Ok(())
}
