//! Application settings. Fixed defaults; nothing is read from the command line.

use crate::data::LoaderOptions;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gas price log, relative to the working directory.
    pub data_path: PathBuf,
    pub loader: LoaderOptions,
    pub title: String,
    /// Cities ticked on first page load.
    pub default_selection: Vec<String>,
    pub bind_addr: SocketAddr,
    pub chart_size: (u32, u32),
    /// Verbose logging for the crate's own targets.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("gasLog.csv"),
            loader: LoaderOptions::default(),
            title: "East Bay Costco Gas Prices".to_string(),
            default_selection: vec!["NEWARK".to_string()],
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8050)),
            chart_size: (900, 450),
            debug: true,
        }
    }
}

impl AppConfig {
    /// Directive handed to the tracing `EnvFilter` when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "gas_prices=debug"
        } else {
            "gas_prices=info"
        }
    }
}
