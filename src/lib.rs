//! metricstore - HTTP API to record and query timestamped metrics
//!
//! Three independent append-only time series (stock quotes, float metrics,
//! integer metrics) stored in SQLite, each with an ingestion endpoint and a
//! filtered, paginated search endpoint behind a shared API-key guard.

pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod server;
pub mod state;
