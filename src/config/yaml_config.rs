use crate::core::throughput::ROTATION_WINDOW;
use crate::core::workflows::parse_hotkey;
use crate::utils::error::{BenchError, Result};
use crate::utils::validation::{
    validate_at_least, validate_existing_file, validate_finite_at_least,
    validate_non_empty_string, validate_path, validate_range, validate_sas_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(alias = "petrel")]
    pub app: AppConfig,
    pub paths: PathsConfig,
    pub data_sources: DataSourcesConfig,
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
    #[serde(alias = "fast")]
    pub cache: CacheConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    pub out_dir: PathBuf,
    pub benchmark: BenchmarkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub exe_path: PathBuf,
    #[serde(default = "default_true")]
    pub project_arg_supported: bool,
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_exclude_titles")]
    pub exclude_titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub project_shared_zgy_local: PathBuf,
    pub project_fast_vzgy_local: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourcesConfig {
    pub shared_zgy_hint: String,
    pub fast_vzgy_hint: String,
    pub azure_blob: AzureBlobConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureBlobConfig {
    pub account: String,
    pub container: String,
    pub example_vds_prefix: Option<String>,
    #[serde(default)]
    pub sas_download_urls: Vec<String>,
    #[serde(default)]
    pub sas_upload_urls: Vec<String>,
}

/// Key sequences in `%` Alt, `^` Ctrl, `+` Shift prefix notation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeysConfig {
    #[serde(default = "default_scrub_key")]
    pub scrub_next_inline: String,
    #[serde(default = "default_attribute_key")]
    pub attribute_compute: String,
    #[serde(default = "default_horizon_key")]
    pub horizon_autotrack: String,
    #[serde(default = "default_export_key")]
    pub export_slice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub logs: Vec<PathBuf>,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_scrub_count")]
    pub scrub_count: u32,
    #[serde(default = "default_scrub_delay_sec")]
    pub scrub_delay_sec: f64,
    #[serde(default = "default_horizon_run_seconds")]
    pub horizon_run_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub nas_test_dir: String,
    pub nas_ping_host: String,
    #[serde(default)]
    pub azure_ping_hosts: Vec<String>,
    #[serde(default = "default_parallel_streams")]
    pub parallel_streams: usize,
    #[serde(default = "default_http_chunk_bytes")]
    pub http_chunk_bytes: u64,
    #[serde(default = "default_probe_duration_sec")]
    pub probe_duration_sec: u64,
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,
}

fn default_true() -> bool {
    true
}

fn default_window_title() -> String {
    "Petrel".to_string()
}

fn default_exclude_titles() -> Vec<String> {
    vec!["File Explorer".to_string()]
}

fn default_scrub_key() -> String {
    "PGDN".to_string()
}

fn default_attribute_key() -> String {
    "%1".to_string()
}

fn default_horizon_key() -> String {
    "%2".to_string()
}

fn default_export_key() -> String {
    "%3".to_string()
}

fn default_scrub_count() -> u32 {
    100
}

fn default_scrub_delay_sec() -> f64 {
    0.04
}

fn default_horizon_run_seconds() -> u64 {
    45
}

fn default_parallel_streams() -> usize {
    4
}

fn default_http_chunk_bytes() -> u64 {
    8 * 1024 * 1024
}

fn default_probe_duration_sec() -> u64 {
    10
}

fn default_ping_count() -> u32 {
    10
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            scrub_next_inline: default_scrub_key(),
            attribute_compute: default_attribute_key(),
            horizon_autotrack: default_horizon_key(),
            export_slice: default_export_key(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            scrub_count: default_scrub_count(),
            scrub_delay_sec: default_scrub_delay_sec(),
            horizon_run_seconds: default_horizon_run_seconds(),
        }
    }
}

impl BenchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BenchError::ConfigNotFoundError {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(BenchError::ConfigParseError {
                message: format!("Configuration file is empty: {}", path.display()),
            });
        }
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(BenchError::ConfigParseError {
                message: "Configuration file is empty".to_string(),
            });
        }

        let processed_content = Self::substitute_env_vars(content)?;
        Ok(serde_yaml_ng::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BenchError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_existing_file("app.exe_path", &self.app.exe_path)?;
        validate_non_empty_string("app.window_title", &self.app.window_title)?;

        validate_existing_file(
            "paths.project_shared_zgy_local",
            &self.paths.project_shared_zgy_local,
        )?;
        validate_existing_file(
            "paths.project_fast_vzgy_local",
            &self.paths.project_fast_vzgy_local,
        )?;

        let azure = &self.data_sources.azure_blob;
        validate_non_empty_string("data_sources.azure_blob.account", &azure.account)?;
        validate_non_empty_string("data_sources.azure_blob.container", &azure.container)?;
        for url in &azure.sas_download_urls {
            validate_sas_url("data_sources.azure_blob.sas_download_urls", url)?;
        }
        for url in &azure.sas_upload_urls {
            validate_sas_url("data_sources.azure_blob.sas_upload_urls", url)?;
        }

        for (field, keys) in [
            ("hotkeys.scrub_next_inline", &self.hotkeys.scrub_next_inline),
            ("hotkeys.attribute_compute", &self.hotkeys.attribute_compute),
            ("hotkeys.horizon_autotrack", &self.hotkeys.horizon_autotrack),
            ("hotkeys.export_slice", &self.hotkeys.export_slice),
        ] {
            parse_hotkey(keys).map_err(|reason| BenchError::InvalidConfigValueError {
                field: field.to_string(),
                value: keys.clone(),
                reason,
            })?;
        }

        let cache_dir = &self.cache.cache_dir;
        validate_path("cache.cache_dir", &cache_dir.to_string_lossy())?;
        // The cache dir itself may not exist yet.
        if let Some(parent) = cache_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                return Err(BenchError::InvalidConfigValueError {
                    field: "cache.cache_dir".to_string(),
                    value: cache_dir.display().to_string(),
                    reason: format!(
                        "Parent directory for cache does not exist: {}",
                        parent.display()
                    ),
                });
            }
        }

        validate_at_least("defaults.scrub_count", self.defaults.scrub_count, 1)?;
        validate_finite_at_least(
            "defaults.scrub_delay_sec",
            self.defaults.scrub_delay_sec,
            0.0,
        )?;
        validate_at_least(
            "defaults.horizon_run_seconds",
            self.defaults.horizon_run_seconds,
            1,
        )?;

        validate_path("out_dir", &self.out_dir.to_string_lossy())?;

        validate_path("benchmark.nas_test_dir", &self.benchmark.nas_test_dir)?;
        validate_non_empty_string("benchmark.nas_ping_host", &self.benchmark.nas_ping_host)?;
        validate_range(
            "benchmark.parallel_streams",
            self.benchmark.parallel_streams,
            1,
            16,
        )?;
        validate_range(
            "benchmark.http_chunk_bytes",
            self.benchmark.http_chunk_bytes,
            1024,
            ROTATION_WINDOW,
        )?;
        validate_at_least(
            "benchmark.probe_duration_sec",
            self.benchmark.probe_duration_sec,
            1,
        )?;
        validate_at_least("benchmark.ping_count", self.benchmark.ping_count, 1)?;

        Ok(())
    }

    /// Creates `out_dir` if needed and checks it is a directory.
    pub fn ensure_out_dir(&self) -> Result<()> {
        if !self.out_dir.exists() {
            std::fs::create_dir_all(&self.out_dir)?;
        }
        if !self.out_dir.is_dir() {
            return Err(BenchError::InvalidConfigValueError {
                field: "out_dir".to_string(),
                value: self.out_dir.display().to_string(),
                reason: "Output path is not a directory".to_string(),
            });
        }
        Ok(())
    }

    pub fn baseline_dir(&self) -> PathBuf {
        self.out_dir.join("baseline")
    }

    pub fn ui_dir(&self) -> PathBuf {
        self.out_dir.join("ui")
    }
}

impl Validate for BenchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Reads, validates and prepares the output directory in one step.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BenchConfig> {
    let config = BenchConfig::from_file(path)?;
    config.validate()?;
    config.ensure_out_dir()?;
    Ok(config)
}
