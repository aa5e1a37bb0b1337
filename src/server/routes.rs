//! HTTP route handlers.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::Serialize;

use crate::collector::SummarizeRequest;
use crate::error::ErrorKind;
use crate::{Error, StreamEvent};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/summarize", post(summarize))
        .route("/summarize/stream", post(summarize_stream))
        .with_state(state)
}

/// Successful summarize response.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

/// Error rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match error.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Upstream | ErrorKind::Cancelled => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            detail: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

/// Liveness check.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": state.service_message,
    }))
}

/// Summarize the request text and return it in one JSON body.
async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload?;
    let result = state.collector.summarize(request).await?;

    Ok(Json(SummarizeResponse {
        summary: result.text,
        incomplete: result.incomplete,
    }))
}

/// Forward summary fragments as a plain-text body while they arrive.
///
/// Failures before the first byte get the usual JSON error; a failure after
/// that aborts the body.
async fn summarize_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let events = state.collector.summarize_stream(request).await?;

    let body = events.filter_map(|event| async move {
        match event {
            Ok(StreamEvent::ContentDelta { delta }) if !delta.is_empty() => {
                Some(Ok(Bytes::from(delta)))
            }
            Ok(StreamEvent::ContentDelta { .. }) | Ok(StreamEvent::Done { .. }) => None,
            Ok(StreamEvent::Error { error }) => {
                tracing::warn!(%error, "Provider failed mid-stream; aborting body");
                Some(Err(Error::streaming(error)))
            }
            Err(error) => {
                tracing::warn!(%error, "Stream failed; aborting body");
                Some(Err(error))
            }
        }
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}
