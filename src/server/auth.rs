//! API key guard
//!
//! One shared middleware checks the X-API-KEY header against the configured
//! secret ahead of every metric route; requests never reach business logic
//! without it. The health endpoint is mounted outside this layer.

use crate::error::AppError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose X-API-KEY header is missing or wrong.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let header = match request.headers().get(API_KEY_HEADER) {
        Some(value) => value,
        None => {
            tracing::warn!("request without API key rejected");
            return AppError::Auth("API key required".to_string()).into_response();
        }
    };

    match header.to_str() {
        Ok(key) if key == state.api_key => next.run(request).await,
        _ => {
            tracing::warn!("request with wrong API key rejected");
            AppError::Auth("Wrong API key".to_string()).into_response()
        }
    }
}
