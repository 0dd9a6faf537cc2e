//! Application state management

use crate::config::Config;
use crate::db::MetricsDb;
use crate::error::Result;
use std::path::Path;

/// State shared across all request handlers
///
/// Constructed once at startup from the loaded configuration; handlers
/// receive it by Arc, there are no ambient globals.
pub struct AppState {
    /// SQLite connection pool
    pub db: MetricsDb,
    /// Shared secret expected in the X-API-KEY header
    pub api_key: String,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let db = MetricsDb::new(Path::new(&config.database))?;
        Ok(Self {
            db,
            api_key: config.api_key.clone(),
        })
    }
}
