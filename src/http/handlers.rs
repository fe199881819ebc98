//! Request handlers.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::ACKNOWLEDGEMENT;

/// `/message`: run one hop and acknowledge without waiting for the forward.
pub async fn message_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();

    let response = match state.relay.handle(&method, &headers, &body).await {
        // the report's forward handle is dropped here; the task keeps running
        Ok(_report) => (StatusCode::OK, ACKNOWLEDGEMENT).into_response(),
        Err(e) => e.into_response(),
    };

    metrics::record_request_duration(start.elapsed().as_secs_f64());
    response
}

/// `/health`: liveness for peers' probes.
pub async fn health_handler() -> &'static str {
    "OK"
}
