//! HTTP API server
//!
//! One add/search route pair per metric type, all behind the shared
//! API-key guard; /health is mounted outside it.

mod auth;
pub mod handlers;
pub mod types;

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let metric_routes = Router::new()
        .route("/stock/add", post(handlers::add_stock))
        .route("/stock/search", get(handlers::search_stock))
        .route("/float_metric/add", post(handlers::add_float_metric))
        .route("/float_metric/search", get(handlers::search_float_metric))
        .route("/integer_metric/add", post(handlers::add_integer_metric))
        .route("/integer_metric/search", get(handlers::search_integer_metric))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(metric_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until interrupted.
pub async fn serve(listen: &str, state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| AppError::Config(format!("invalid listen address '{}': {}", listen, e)))?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("metricstore API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
