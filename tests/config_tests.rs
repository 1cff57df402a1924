mod common;

use common::{Fixture, SAS_URL};
use fast_bench::config::BenchConfig;
use fast_bench::utils::validation::Validate;
use fast_bench::{load_config, BenchError};

#[test]
fn test_valid_config_loads_and_creates_out_dir() {
    let fixture = Fixture::new();
    let path = fixture.write_config(&fixture.yaml(&[SAS_URL], "127.0.0.1"));
    assert!(!fixture.out_dir().exists());

    let config = load_config(&path).unwrap();

    assert!(fixture.out_dir().is_dir());
    assert_eq!(config.app.window_title, "Petrel");
    assert_eq!(config.defaults.scrub_count, 10);
    assert_eq!(config.benchmark.parallel_streams, 2);
    assert_eq!(config.data_sources.azure_blob.sas_download_urls, vec![SAS_URL]);
    assert_eq!(config.baseline_dir(), fixture.out_dir().join("baseline"));
}

#[test]
fn test_missing_file_is_config_not_found() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, BenchError::ConfigNotFoundError { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_empty_file_rejected() {
    let fixture = Fixture::new();
    let path = fixture.write_config("");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, BenchError::ConfigParseError { .. }));
}

#[test]
fn test_missing_azure_blob_section_names_field() {
    let fixture = Fixture::new();
    let yaml = fixture.yaml(&[], "127.0.0.1");
    let start = yaml.find("  azure_blob:").unwrap();
    let end = yaml.find("fast:").unwrap();
    let without = format!("{}{}", &yaml[..start], &yaml[end..]);
    let path = fixture.write_config(&without);

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("azure_blob"));
}

#[test]
fn test_missing_exe_path_rejected() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.path("Petrel.exe")).unwrap();
    let path = fixture.write_config(&fixture.yaml(&[], "127.0.0.1"));

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("app.exe_path"));
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn test_sas_url_must_be_https() {
    let fixture = Fixture::new();
    let http = SAS_URL.replace("https://", "http://");
    let path = fixture.write_config(&fixture.yaml(&[&http], "127.0.0.1"));

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("https://"));
}

#[test]
fn test_sas_url_must_target_blob_storage() {
    let fixture = Fixture::new();
    let path = fixture.write_config(&fixture.yaml(&["https://example.com/blob?sig=x"], "127.0.0.1"));

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid Azure Blob URL"));
}

#[test]
fn test_parallel_streams_bounds() {
    let fixture = Fixture::new();
    for streams in ["0", "100"] {
        let yaml = fixture
            .yaml(&[], "127.0.0.1")
            .replace("parallel_streams: 2", &format!("parallel_streams: {}", streams));
        let config = BenchConfig::from_yaml_str(&yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("benchmark.parallel_streams"));
    }
}

#[test]
fn test_non_finite_scrub_delay_rejected() {
    let fixture = Fixture::new();
    for delay in [".inf", ".nan", "-.inf"] {
        let yaml = fixture.yaml(&[], "127.0.0.1").replace(
            "scrub_count: 10",
            &format!("scrub_count: 10\n  scrub_delay_sec: {}", delay),
        );
        let config = BenchConfig::from_yaml_str(&yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("defaults.scrub_delay_sec"), "{}", delay);
    }
}

#[test]
fn test_http_chunk_bytes_upper_bound() {
    let fixture = Fixture::new();
    for chunk in ["18446744073709551615", "104857601"] {
        let yaml = fixture
            .yaml(&[], "127.0.0.1")
            .replace("http_chunk_bytes: 4096", &format!("http_chunk_bytes: {}", chunk));
        let config = BenchConfig::from_yaml_str(&yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("benchmark.http_chunk_bytes"), "{}", chunk);
    }

    let yaml = fixture
        .yaml(&[SAS_URL], "127.0.0.1")
        .replace("http_chunk_bytes: 4096", "http_chunk_bytes: 104857600");
    assert!(BenchConfig::from_yaml_str(&yaml).unwrap().validate().is_ok());
}

#[test]
fn test_bad_hotkey_rejected_at_load() {
    let fixture = Fixture::new();
    let yaml = fixture.yaml(&[], "127.0.0.1").replace(
        "defaults:",
        "hotkeys:\n  scrub_next_inline: '%NOPE'\ndefaults:",
    );
    let config = BenchConfig::from_yaml_str(&yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("hotkeys.scrub_next_inline"));
}

#[test]
fn test_cache_parent_must_exist() {
    let fixture = Fixture::new();
    let yaml = fixture.yaml(&[], "127.0.0.1").replace(
        &fixture.path("cache").display().to_string(),
        &fixture.path("missing/cache").display().to_string(),
    );
    let config = BenchConfig::from_yaml_str(&yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("cache.cache_dir"));
}

#[test]
fn test_example_config_parses() {
    let content = include_str!("../config/config.example.yaml");
    let config = BenchConfig::from_yaml_str(content).unwrap();
    assert_eq!(config.hotkeys.attribute_compute, "%1");
    assert_eq!(config.benchmark.http_chunk_bytes, 8 * 1024 * 1024);
    assert_eq!(config.data_sources.azure_blob.sas_download_urls.len(), 1);
}
