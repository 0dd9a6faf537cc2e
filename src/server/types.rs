//! Request and response types for the HTTP API

use crate::db::models::Page;
use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Label length bound for the stock table.
pub const STOCK_METRIC_MAX_LEN: usize = 10;
/// Label length bound for the float/integer metric tables.
pub const VALUE_METRIC_MAX_LEN: usize = 50;

/// Ingestion body for POST /stock/add
///
/// The body must match the table's field set exactly; unknown fields are
/// rejected at deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddStockRequest {
    pub time: String,
    pub price: f64,
    pub volume: i64,
    pub metric: String,
}

/// Ingestion body for POST /float_metric/add
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddFloatMetricRequest {
    pub time: String,
    pub value: f64,
    pub metric: String,
}

/// Ingestion body for POST /integer_metric/add
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddIntegerMetricRequest {
    pub time: String,
    pub value: i64,
    pub metric: String,
}

impl AddStockRequest {
    pub fn validate(&self) -> Result<()> {
        validate_time(&self.time)?;
        validate_metric(&self.metric, STOCK_METRIC_MAX_LEN)
    }
}

impl AddFloatMetricRequest {
    pub fn validate(&self) -> Result<()> {
        validate_time(&self.time)?;
        validate_metric(&self.metric, VALUE_METRIC_MAX_LEN)
    }
}

impl AddIntegerMetricRequest {
    pub fn validate(&self) -> Result<()> {
        validate_time(&self.time)?;
        validate_metric(&self.metric, VALUE_METRIC_MAX_LEN)
    }
}

/// Timestamps are stored verbatim but must be ISO-8601, with or without
/// a UTC offset.
fn validate_time(time: &str) -> Result<()> {
    let parses =
        DateTime::parse_from_rfc3339(time).is_ok() || time.parse::<NaiveDateTime>().is_ok();
    if parses {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "time must be an ISO-8601 timestamp, got '{}'",
            time
        )))
    }
}

fn validate_metric(metric: &str, max_len: usize) -> Result<()> {
    if metric.is_empty() {
        return Err(AppError::Validation("metric must not be empty".to_string()));
    }
    if metric.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "metric must be at most {} characters",
            max_len
        )));
    }
    Ok(())
}

/// Query parameters for GET /<metric-type>/search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_page")]
    pub page: i64,
    /// JSON array of filter clauses; absent means unfiltered
    pub filter: Option<String>,
}

fn default_page() -> i64 {
    1
}

/// Envelope wrapping paginated search results.
#[derive(Debug, Serialize)]
pub struct SearchEnvelope<T> {
    pub resource: Page<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formats_accepted() {
        assert!(validate_time("2024-03-01T10:00:00").is_ok());
        assert!(validate_time("2024-03-01T10:00:00Z").is_ok());
        assert!(validate_time("2024-03-01T10:00:00+05:30").is_ok());
        assert!(validate_time("2024-03-01T10:00:00.250Z").is_ok());
    }

    #[test]
    fn test_bad_time_rejected() {
        assert!(validate_time("yesterday").is_err());
        assert!(validate_time("2024-13-01T10:00:00").is_err());
        assert!(validate_time("").is_err());
    }

    #[test]
    fn test_metric_length_bounds() {
        assert!(validate_metric("AAPL", STOCK_METRIC_MAX_LEN).is_ok());
        assert!(validate_metric("ABCDEFGHIJ", STOCK_METRIC_MAX_LEN).is_ok());
        assert!(validate_metric("ABCDEFGHIJK", STOCK_METRIC_MAX_LEN).is_err());
        assert!(validate_metric("", STOCK_METRIC_MAX_LEN).is_err());
    }

    #[test]
    fn test_unknown_body_field_rejected() {
        let err = serde_json::from_str::<AddStockRequest>(
            r#"{"time":"2024-03-01T10:00:00","price":1.0,"volume":1,"metric":"AAPL","extra":1}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_body_field_rejected() {
        let err = serde_json::from_str::<AddStockRequest>(
            r#"{"time":"2024-03-01T10:00:00","price":1.0,"metric":"AAPL"}"#,
        );
        assert!(err.is_err());
    }
}
