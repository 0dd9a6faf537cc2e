use anyhow::Context;
use metricstore::config::{Config, Environment};
use metricstore::server;
use metricstore::state::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_var = std::env::var("METRICSTORE_ENV").ok();
    let environment = Environment::from_var(env_var.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| environment.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "conf.yml".to_string());
    let config = Config::load(Path::new(&config_path), environment)
        .with_context(|| format!("failed to load config from {}", config_path))?;

    tracing::info!(?environment, "starting metricstore");

    let state = Arc::new(AppState::new(&config).context("failed to initialize state")?);
    server::serve(&config.listen, state).await?;

    Ok(())
}
