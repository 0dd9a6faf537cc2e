//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_stock", CREATE_STOCK_TABLE)?;
    run_migration(conn, "002_float_metric", CREATE_FLOAT_METRIC_TABLE)?;
    run_migration(conn, "003_integer_metric", CREATE_INTEGER_METRIC_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_STOCK_TABLE: &str = r#"
CREATE TABLE stock (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time TEXT NOT NULL,
    price REAL NOT NULL,
    volume INTEGER NOT NULL,
    metric TEXT NOT NULL
);
CREATE INDEX idx_stock_time ON stock(time);
CREATE INDEX idx_stock_metric ON stock(metric);
"#;

const CREATE_FLOAT_METRIC_TABLE: &str = r#"
CREATE TABLE float_metric (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time TEXT NOT NULL,
    value REAL NOT NULL,
    metric TEXT NOT NULL
);
CREATE INDEX idx_float_metric_time ON float_metric(time);
CREATE INDEX idx_float_metric_metric ON float_metric(metric);
"#;

const CREATE_INTEGER_METRIC_TABLE: &str = r#"
CREATE TABLE integer_metric (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time TEXT NOT NULL,
    value INTEGER NOT NULL,
    metric TEXT NOT NULL
);
CREATE INDEX idx_integer_metric_time ON integer_metric(time);
CREATE INDEX idx_integer_metric_metric ON integer_metric(metric);
"#;
