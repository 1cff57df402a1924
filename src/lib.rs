pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{default_gpu_probe, HttpRangeFetcher, LocalStorage};
pub use config::{load_config, BenchConfig};
pub use core::{BaselineProbe, MetricsAgent};
pub use utils::error::{BenchError, Result};
