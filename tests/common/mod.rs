#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SAS_URL: &str =
    "https://acct.blob.core.windows.net/vds/field.vds?sv=2022-11-02&sig=abc";

/// A workspace with every file a valid configuration points at.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Petrel.exe"), b"MZ").unwrap();
        fs::write(dir.path().join("shared.pet"), b"project").unwrap();
        fs::write(dir.path().join("fast.pet"), b"project").unwrap();
        fs::create_dir(dir.path().join("nas")).unwrap();
        fs::write(dir.path().join("nas").join("survey.zgy"), vec![3u8; 256 * 1024]).unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.path("out")
    }

    /// YAML for this fixture; `sas_urls` and `ping_host` are inserted verbatim.
    pub fn yaml(&self, sas_urls: &[&str], ping_host: &str) -> String {
        let urls = if sas_urls.is_empty() {
            "[]".to_string()
        } else {
            sas_urls
                .iter()
                .map(|u| format!("\n      - '{}'", u))
                .collect::<String>()
        };
        format!(
            r#"petrel:
  exe_path: '{exe}'
  window_title: Petrel
paths:
  project_shared_zgy_local: '{shared}'
  project_fast_vzgy_local: '{fast}'
data_sources:
  shared_zgy_hint: '\\NAS\field.zgy'
  fast_vzgy_hint: '\\FAST\field.zgy'
  azure_blob:
    account: acct
    container: vds
    sas_download_urls: {urls}
fast:
  cache_dir: '{cache}'
defaults:
  scrub_count: 10
out_dir: '{out}'
benchmark:
  nas_test_dir: '{nas}'
  nas_ping_host: '{ping}'
  azure_ping_hosts: ['{ping}']
  parallel_streams: 2
  http_chunk_bytes: 4096
  probe_duration_sec: 1
  ping_count: 1
"#,
            exe = self.path("Petrel.exe").display(),
            shared = self.path("shared.pet").display(),
            fast = self.path("fast.pet").display(),
            urls = urls,
            cache = self.path("cache").display(),
            out = self.out_dir().display(),
            nas = self.path("nas").display(),
            ping = ping_host,
        )
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.path("config.yaml");
        fs::write(&path, content).unwrap();
        path
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
