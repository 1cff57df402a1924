use crate::utils::error::{BenchError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Host suffix every Azure Blob SAS URL must point at.
pub const AZURE_BLOB_HOST_SUFFIX: &str = "blob.core.windows.net";

pub fn validate_sas_url(field_name: &str, url_str: &str) -> Result<()> {
    if !url_str.starts_with("https://") {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "SAS URL must start with https://".to_string(),
        });
    }

    let url = Url::parse(url_str).map_err(|e| BenchError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    match url.host_str() {
        Some(host) if host.ends_with(AZURE_BLOB_HOST_SUFFIX) => Ok(()),
        _ => Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid Azure Blob URL: host must end with {}", AZURE_BLOB_HOST_SUFFIX),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_existing_file(field_name: &str, path: &Path) -> Result<()> {
    validate_path(field_name, &path.to_string_lossy())?;

    if !path.exists() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "File not found".to_string(),
        });
    }
    if !path.is_file() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "Path is not a file".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_at_least<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min_value: T,
) -> Result<()> {
    if value < min_value {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Like `validate_at_least`, but also rejects NaN and infinities.
pub fn validate_finite_at_least(field_name: &str, value: f64, min_value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    validate_at_least(field_name, value, min_value)
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sas_url() {
        assert!(validate_sas_url(
            "sas_download_urls",
            "https://acct.blob.core.windows.net/c/file.bin?sv=2023&sig=abc"
        )
        .is_ok());

        let err = validate_sas_url("sas_download_urls", "http://example.com/file.bin").unwrap_err();
        assert!(err.to_string().contains("https://"));

        let err = validate_sas_url("sas_download_urls", "https://example.com/file.bin").unwrap_err();
        assert!(err.to_string().to_lowercase().contains("azure blob"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("benchmark.parallel_streams", 4, 1, 16).is_ok());
        assert!(validate_range("benchmark.parallel_streams", 0, 1, 16).is_err());
        assert!(validate_range("benchmark.parallel_streams", 100, 1, 16).is_err());
    }

    #[test]
    fn test_validate_at_least_float() {
        assert!(validate_at_least("defaults.scrub_delay_sec", 0.0, 0.0).is_ok());
        assert!(validate_at_least("defaults.scrub_delay_sec", -0.5, 0.0).is_err());
    }

    #[test]
    fn test_validate_finite_at_least_rejects_nan_and_inf() {
        assert!(validate_finite_at_least("defaults.scrub_delay_sec", 0.04, 0.0).is_ok());
        assert!(validate_finite_at_least("defaults.scrub_delay_sec", -1.0, 0.0).is_err());
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_finite_at_least("defaults.scrub_delay_sec", value, 0.0).unwrap_err();
            assert!(err.to_string().contains("finite"));
        }
    }

    #[test]
    fn test_validate_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_existing_file("app.exe_path", file.path()).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let err = validate_existing_file("app.exe_path", dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a file"));

        let missing = dir.path().join("missing.exe");
        let err = validate_existing_file("app.exe_path", &missing).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("not found"));
    }
}
