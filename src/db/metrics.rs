//! Per-table metric persistence
//!
//! Each table has one insert (append-only, single statement) and one
//! filtered, paginated search. Rows are never updated or deleted.

use crate::db::models::{FloatMetricRow, IntegerMetricRow, Page, StockRow};
use crate::db::query::run_paginated;
use crate::error::Result;
use crate::filter::Condition;
use rusqlite::{params, Connection};

// ============================================================================
// Stock
// ============================================================================

/// Insert one stock quote row
pub fn insert_stock(
    conn: &Connection,
    time: &str,
    price: f64,
    volume: i64,
    metric: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO stock (time, price, volume, metric) VALUES (?1, ?2, ?3, ?4)",
        params![time, price, volume, metric],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Search stock rows with translated filter conditions
pub fn search_stock(conn: &Connection, conditions: &[Condition], page: i64) -> Result<Page<StockRow>> {
    run_paginated(
        conn,
        "stock",
        "id, time, price, volume, metric",
        conditions,
        page,
        |row| {
            Ok(StockRow {
                id: row.get(0)?,
                time: row.get(1)?,
                price: row.get(2)?,
                volume: row.get(3)?,
                metric: row.get(4)?,
            })
        },
    )
}

// ============================================================================
// Float metrics
// ============================================================================

/// Insert one float metric row
pub fn insert_float_metric(conn: &Connection, time: &str, value: f64, metric: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO float_metric (time, value, metric) VALUES (?1, ?2, ?3)",
        params![time, value, metric],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Search float metric rows with translated filter conditions
pub fn search_float_metric(
    conn: &Connection,
    conditions: &[Condition],
    page: i64,
) -> Result<Page<FloatMetricRow>> {
    run_paginated(
        conn,
        "float_metric",
        "id, time, value, metric",
        conditions,
        page,
        |row| {
            Ok(FloatMetricRow {
                id: row.get(0)?,
                time: row.get(1)?,
                value: row.get(2)?,
                metric: row.get(3)?,
            })
        },
    )
}

// ============================================================================
// Integer metrics
// ============================================================================

/// Insert one integer metric row
pub fn insert_integer_metric(
    conn: &Connection,
    time: &str,
    value: i64,
    metric: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO integer_metric (time, value, metric) VALUES (?1, ?2, ?3)",
        params![time, value, metric],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Search integer metric rows with translated filter conditions
pub fn search_integer_metric(
    conn: &Connection,
    conditions: &[Condition],
    page: i64,
) -> Result<Page<IntegerMetricRow>> {
    run_paginated(
        conn,
        "integer_metric",
        "id, time, value, metric",
        conditions,
        page,
        |row| {
            Ok(IntegerMetricRow {
                id: row.get(0)?,
                time: row.get(1)?,
                value: row.get(2)?,
                metric: row.get(3)?,
            })
        },
    )
}
