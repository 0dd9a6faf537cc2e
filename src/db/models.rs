//! Database models

use serde::Serialize;

/// Stock quote row
///
/// `id` is the surrogate key; search responses marshal only the payload
/// fields, matching the public resource shape.
#[derive(Debug, Clone, Serialize)]
pub struct StockRow {
    #[serde(skip_serializing)]
    pub id: i64,
    pub time: String,
    pub price: f64,
    pub volume: i64,
    pub metric: String,
}

/// Float metric row
#[derive(Debug, Clone, Serialize)]
pub struct FloatMetricRow {
    #[serde(skip_serializing)]
    pub id: i64,
    pub time: String,
    pub value: f64,
    pub metric: String,
}

/// Integer metric row
#[derive(Debug, Clone, Serialize)]
pub struct IntegerMetricRow {
    #[serde(skip_serializing)]
    pub id: i64,
    pub time: String,
    pub value: i64,
    pub metric: String,
}

/// One page of query results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub datas: Vec<T>,
    pub total_results: i64,
    pub current_page: i64,
    pub pages: i64,
}
