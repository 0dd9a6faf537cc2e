//! SQLite database module

pub mod models;
mod metrics;
mod migrations;
mod query;

use crate::error::Result;
use crate::filter::Condition;
use models::{FloatMetricRow, IntegerMetricRow, Page, StockRow};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub use query::PAGE_SIZE;

/// SQLite database wrapper
///
/// Every request checks out one pooled connection and runs a single
/// statement (insert) or a count+select pair (search); isolation is
/// delegated to SQLite.
pub struct MetricsDb {
    pool: Pool<SqliteConnectionManager>,
}

impl MetricsDb {
    /// Open the database, enable WAL mode, and run migrations
    pub fn new(path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        });
        let pool = Pool::new(manager)?;

        let db = Self { pool };
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.pool.get()?;
        migrations::run_migrations(&conn)
    }

    // ========== Stock Methods ==========

    /// Insert one stock quote row, returning its id
    pub fn insert_stock(&self, time: &str, price: f64, volume: i64, metric: &str) -> Result<i64> {
        let conn = self.pool.get()?;
        metrics::insert_stock(&conn, time, price, volume, metric)
    }

    /// Search stock rows
    pub fn search_stock(&self, conditions: &[Condition], page: i64) -> Result<Page<StockRow>> {
        let conn = self.pool.get()?;
        metrics::search_stock(&conn, conditions, page)
    }

    // ========== Float Metric Methods ==========

    /// Insert one float metric row, returning its id
    pub fn insert_float_metric(&self, time: &str, value: f64, metric: &str) -> Result<i64> {
        let conn = self.pool.get()?;
        metrics::insert_float_metric(&conn, time, value, metric)
    }

    /// Search float metric rows
    pub fn search_float_metric(
        &self,
        conditions: &[Condition],
        page: i64,
    ) -> Result<Page<FloatMetricRow>> {
        let conn = self.pool.get()?;
        metrics::search_float_metric(&conn, conditions, page)
    }

    // ========== Integer Metric Methods ==========

    /// Insert one integer metric row, returning its id
    pub fn insert_integer_metric(&self, time: &str, value: i64, metric: &str) -> Result<i64> {
        let conn = self.pool.get()?;
        metrics::insert_integer_metric(&conn, time, value, metric)
    }

    /// Search integer metric rows
    pub fn search_integer_metric(
        &self,
        conditions: &[Condition],
        page: i64,
    ) -> Result<Page<IntegerMetricRow>> {
        let conn = self.pool.get()?;
        metrics::search_integer_metric(&conn, conditions, page)
    }
}
