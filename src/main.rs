//! Gas Prices - historical gas price dashboard
//!
//! Loads the gas price log once, then serves a page with a line chart per
//! city and a checklist that redraws the chart on change.

mod charts;
mod config;
mod data;
mod web;

use anyhow::Context;
use config::AppConfig;
use data::DataLoader;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use web::{AppState, Dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting gas price dashboard");

    // A malformed or missing log stops startup before anything is served.
    let table = DataLoader::new(config.loader)
        .load_csv(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(Dashboard::new(table, config))?);

    web::serve(state, addr).await?;
    Ok(())
}
