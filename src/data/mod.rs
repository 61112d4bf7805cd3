//! Data module - CSV loading and chart series preparation

pub(crate) mod loader;
pub(crate) mod processor;

pub use loader::{DataLoader, GasTable, LoaderOptions};
pub use processor::{ChartDescription, DataProcessor, Selection};
