//! HTTP endpoint handlers
//!
//! Every metric type gets an add/search pair. Ingestion persists one row
//! per request; persistence failures are logged with full detail but the
//! caller only sees the opaque "K0" code. Search translates the filter
//! parameter into SQL conditions and returns one page of rows inside the
//! `resource` envelope.

use crate::error::{AppError, Result};
use crate::filter::{self, FilterClause, STOCK_FILTER, VALUE_FILTER};
use crate::server::types::*;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Health check endpoint - GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "metricstore",
    }))
}

// ============================================================================
// Ingestion
// ============================================================================

/// Unpack the body extractor, mapping deserialization failures (missing or
/// unknown fields, type mismatches) onto a validation error before any
/// business logic runs.
fn require_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    }
}

/// Persist one row, collapsing any store failure to the opaque "K0" code.
fn ingest_response(result: Result<i64>, table: &str) -> Response {
    match result {
        Ok(id) => {
            debug!(table, id, "row ingested");
            (StatusCode::CREATED, Json("OK")).into_response()
        }
        Err(e) => {
            error!(table, "failed to persist row: {}", e);
            (StatusCode::BAD_REQUEST, Json("K0")).into_response()
        }
    }
}

/// POST /stock/add
pub async fn add_stock(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AddStockRequest>, JsonRejection>,
) -> Result<Response> {
    let body = require_body(payload)?;
    body.validate()?;
    Ok(ingest_response(
        state
            .db
            .insert_stock(&body.time, body.price, body.volume, &body.metric),
        "stock",
    ))
}

/// POST /float_metric/add
pub async fn add_float_metric(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AddFloatMetricRequest>, JsonRejection>,
) -> Result<Response> {
    let body = require_body(payload)?;
    body.validate()?;
    Ok(ingest_response(
        state
            .db
            .insert_float_metric(&body.time, body.value, &body.metric),
        "float_metric",
    ))
}

/// POST /integer_metric/add
pub async fn add_integer_metric(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AddIntegerMetricRequest>, JsonRejection>,
) -> Result<Response> {
    let body = require_body(payload)?;
    body.validate()?;
    Ok(ingest_response(
        state
            .db
            .insert_integer_metric(&body.time, body.value, &body.metric),
        "integer_metric",
    ))
}

// ============================================================================
// Search
// ============================================================================

/// Parse the filter parameter, defaulting an absent one to the empty
/// clause list (an unfiltered query).
fn parse_clauses(params: &SearchParams) -> Result<Vec<FilterClause>> {
    match params.filter.as_deref() {
        Some(raw) => filter::parse_filter(raw),
        None => Ok(Vec::new()),
    }
}

/// GET /stock/search
pub async fn search_stock(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let conditions = STOCK_FILTER.translate(&parse_clauses(&params)?);
    let page = state.db.search_stock(&conditions, params.page)?;
    info!(
        total = page.total_results,
        page = page.current_page,
        "stock search served"
    );
    Ok(Json(SearchEnvelope { resource: page }).into_response())
}

/// GET /float_metric/search
pub async fn search_float_metric(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let conditions = VALUE_FILTER.translate(&parse_clauses(&params)?);
    let page = state.db.search_float_metric(&conditions, params.page)?;
    Ok(Json(SearchEnvelope { resource: page }).into_response())
}

/// GET /integer_metric/search
pub async fn search_integer_metric(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let conditions = VALUE_FILTER.translate(&parse_clauses(&params)?);
    let page = state.db.search_integer_metric(&conditions, params.page)?;
    Ok(Json(SearchEnvelope { resource: page }).into_response())
}

#[cfg(test)]
mod tests {
    use crate::server::build_router;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const API_KEY: &str = "test-secret";

    fn test_router(dir: &TempDir) -> Router {
        let config = crate::config::Config {
            environment: crate::config::Environment::Development,
            api_key: API_KEY.to_string(),
            listen: "127.0.0.1:0".to_string(),
            database: dir.path().join("test.db").to_string_lossy().into_owned(),
        };
        build_router(Arc::new(AppState::new(&config).unwrap()))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", API_KEY)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-api-key", API_KEY)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    const VALID_STOCK: &str =
        r#"{"time":"2024-03-01T10:00:00","price":187.5,"volume":1200,"metric":"AAPL"}"#;

    #[tokio::test]
    async fn test_missing_api_key_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/stock/add")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(VALID_STOCK))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/stock/search")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_api_key_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder()
            .uri("/stock/search")
            .header("x-api-key", "not-the-key")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_needs_no_key() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_add_then_search_roundtrip() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router.clone().oneshot(post_json("/stock/add", VALID_STOCK)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, serde_json::json!("OK"));

        let response = router.oneshot(get("/stock/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resource"]["total_results"], 1);
        assert_eq!(body["resource"]["current_page"], 1);
        assert_eq!(body["resource"]["pages"], 1);
        assert_eq!(body["resource"]["datas"][0]["metric"], "AAPL");
        assert_eq!(body["resource"]["datas"][0]["price"], 187.5);
        // The surrogate key is not part of the resource shape
        assert!(body["resource"]["datas"][0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_missing_field_rejected_and_not_persisted() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        // volume omitted
        let body = r#"{"time":"2024-03-01T10:00:00","price":187.5,"metric":"AAPL"}"#;
        let response = router.clone().oneshot(post_json("/stock/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router.oneshot(get("/stock/search")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["resource"]["total_results"], 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_returns_opaque_code() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        // Drop the table out from under the pool so a valid body fails
        // at the store instead of at validation.
        let conn = rusqlite::Connection::open(dir.path().join("test.db")).unwrap();
        conn.execute_batch("DROP TABLE stock;").unwrap();

        let response = router.oneshot(post_json("/stock/add", VALID_STOCK)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, serde_json::json!("K0"));
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let body = r#"{"time":"2024-03-01T10:00:00","price":1.0,"volume":1,"metric":"AAPL","color":"red"}"#;
        let response = router.oneshot(post_json("/stock/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_time_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let body = r#"{"time":"yesterday","price":1.0,"volume":1,"metric":"AAPL"}"#;
        let response = router.oneshot(post_json("/stock/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlong_metric_rejected() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let body = r#"{"time":"2024-03-01T10:00:00","price":1.0,"volume":1,"metric":"MORETHANTENCHARS"}"#;
        let response = router.oneshot(post_json("/stock/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_label_filter_via_http() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        for (metric, price) in [("AAPL", 187.5), ("MSFT", 420.0)] {
            let body = format!(
                r#"{{"time":"2024-03-01T10:00:00","price":{},"volume":1,"metric":"{}"}}"#,
                price, metric
            );
            let response = router.clone().oneshot(post_json("/stock/add", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let uri = "/stock/search?filter=%5B%7B%22name%22%3A%22metric%22%2C%22val%22%3A%22AAPL%22%7D%5D";
        let response = router.oneshot(get(uri)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["resource"]["total_results"], 1);
        assert_eq!(body["resource"]["datas"][0]["metric"], "AAPL");
    }

    #[tokio::test]
    async fn test_unknown_clause_ignored_via_http() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router
            .clone()
            .oneshot(post_json("/stock/add", VALID_STOCK))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // [{"name":"unknown_col","op":"eq","val":1}]
        let uri = "/stock/search?filter=%5B%7B%22name%22%3A%22unknown_col%22%2C%22op%22%3A%22eq%22%2C%22val%22%3A1%7D%5D";
        let response = router.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resource"]["total_results"], 1);
    }

    #[tokio::test]
    async fn test_malformed_filter_bad_request() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router.oneshot(get("/stock/search?filter=not-json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_pagination_via_http() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        for i in 0..25 {
            let body = format!(
                r#"{{"time":"2024-03-01T10:00:00","value":{},"metric":"connections"}}"#,
                i
            );
            let response = router
                .clone()
                .oneshot(post_json("/integer_metric/add", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = router.clone().oneshot(get("/integer_metric/search?page=2")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["resource"]["datas"].as_array().unwrap().len(), 5);
        assert_eq!(body["resource"]["total_results"], 25);
        assert_eq!(body["resource"]["pages"], 2);
        assert_eq!(body["resource"]["current_page"], 2);

        let response = router.oneshot(get("/integer_metric/search?page=3")).await.unwrap();
        let body = body_json(response).await;
        assert!(body["resource"]["datas"].as_array().unwrap().is_empty());
        assert_eq!(body["resource"]["total_results"], 25);
        assert_eq!(body["resource"]["pages"], 2);
    }

    #[tokio::test]
    async fn test_float_metric_roundtrip() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let body = r#"{"time":"2024-03-01T10:00:00","value":21.5,"metric":"temperature"}"#;
        let response = router.clone().oneshot(post_json("/float_metric/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router.oneshot(get("/float_metric/search")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["resource"]["datas"][0]["value"], 21.5);
    }
}
