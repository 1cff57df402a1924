#[cfg(feature = "cli")]
pub mod cli;
pub mod yaml_config;

pub use yaml_config::{
    load_config, AppConfig, AzureBlobConfig, BenchConfig, BenchmarkConfig, CacheConfig,
    DataSourcesConfig, DefaultsConfig, HotkeysConfig, PathsConfig,
};
