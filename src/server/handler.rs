//! Request handling for the `/mcp` endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::llm::{drain, DrainState, LlmProvider};

#[derive(Debug, Deserialize)]
pub struct McpRequest {
    pub problem_context: String,
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl McpResponse {
    fn solution(content: String) -> Self {
        Self {
            potential_solution: Some(content),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            potential_solution: None,
            error: Some(message.into()),
        }
    }
}

/// Handle one MCP request: validate, stream, aggregate, reply once.
///
/// The body is decoded by hand so a malformed request maps to 400 with a
/// JSON error body rather than a framework rejection. A mid-stream failure
/// yields a pure error response; this endpoint has no place for partial
/// content.
pub async fn mcp(
    State(provider): State<Arc<dyn LlmProvider>>,
    body: Bytes,
) -> (StatusCode, Json<McpResponse>) {
    let request: McpRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("failed to decode request body: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(McpResponse::failure("Invalid request body")),
            );
        }
    };

    if request.problem_context.is_empty() {
        warn!("validation error: ProblemContext was empty");
        return (
            StatusCode::BAD_REQUEST,
            Json(McpResponse::failure("ProblemContext cannot be empty")),
        );
    }

    let rx = match provider.stream(&request.problem_context).await {
        Ok(rx) => rx,
        Err(e) => {
            error!("failed to set up LLM stream: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(McpResponse::failure(format!(
                    "Error getting response from LLM: {e}"
                ))),
            );
        }
    };

    let aggregate = drain(rx).await;

    if aggregate.state() == DrainState::Failed {
        let message = aggregate.error().unwrap_or("stream failed");
        error!("LLM stream failed: {message}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(McpResponse::failure(format!(
                "Error getting response from LLM: {message}"
            ))),
        );
    }

    (
        StatusCode::OK,
        Json(McpResponse::solution(aggregate.into_content())),
    )
}
