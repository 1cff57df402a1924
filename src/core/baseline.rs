//! Baseline probe: machine inventory plus NAS and Azure Blob ceilings.

use crate::adapters::storage::LocalStorage;
use crate::config::BenchConfig;
use crate::core::machine::collect_machine_specs;
use crate::core::ping::ping_host;
use crate::core::throughput::{probe_file, probe_http, ProbeSettings};
use crate::domain::model::{AzureResults, BaselineResults, NasResults, Outcome, PingReport};
use crate::domain::ports::{GpuProbe, RangeFetcher, Storage};
use crate::utils::charts::{create_latency_chart, create_throughput_chart};
use crate::utils::error::Result;
use crate::utils::monitor::HostNetMonitor;
use crate::utils::timeutil::utc_iso8601;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const RULE: usize = 60;

pub struct BaselineProbe {
    config: BenchConfig,
    fetcher: Arc<dyn RangeFetcher>,
    gpu: Box<dyn GpuProbe>,
    net: HostNetMonitor,
    probe_duration: Duration,
}

impl BaselineProbe {
    pub fn new(config: BenchConfig, fetcher: Arc<dyn RangeFetcher>, gpu: Box<dyn GpuProbe>) -> Self {
        let probe_duration = Duration::from_secs(config.benchmark.probe_duration_sec);
        Self {
            config,
            fetcher,
            gpu,
            net: HostNetMonitor::new(),
            probe_duration,
        }
    }

    pub fn with_probe_duration(mut self, duration: Duration) -> Self {
        self.probe_duration = duration;
        self
    }

    fn settings(&self, streams: usize, link_speed_mbps: Option<u64>) -> ProbeSettings {
        ProbeSettings::new(self.config.benchmark.http_chunk_bytes, self.probe_duration)
            .with_streams(streams)
            .with_link_speed(link_speed_mbps)
    }

    pub async fn run(&mut self) -> BaselineResults {
        banner("FAST Bench - Baseline Probe");
        let timestamp = utc_iso8601(None);
        let machine = collect_machine_specs(self.gpu.as_ref());
        let link_speed = machine.max_link_speed_mbps();

        banner("NAS Performance Tests");
        let nas = self.run_nas(link_speed).await;

        banner("Azure Blob Performance Tests");
        let azure = self.run_azure(link_speed).await;

        BaselineResults {
            timestamp,
            machine,
            nas,
            azure,
        }
    }

    async fn run_nas(&mut self, link_speed: Option<u64>) -> NasResults {
        let bench = &self.config.benchmark;
        let ping = ping_host(&bench.nas_ping_host, bench.ping_count).await;

        let throughput = match find_test_file(Path::new(&bench.nas_test_dir)) {
            Ok(file) => {
                let settings = self.settings(1, link_speed);
                probe_file(&file, &settings, &mut self.net).await
            }
            Err(reason) => {
                println!("  NAS test file unavailable ({}): {}", reason, bench.nas_test_dir);
                tracing::warn!("Skipping NAS throughput: {}", reason);
                Outcome::failed(reason)
            }
        };

        NasResults { ping, throughput }
    }

    async fn run_azure(&mut self, link_speed: Option<u64>) -> AzureResults {
        let mut pings: BTreeMap<String, PingReport> = BTreeMap::new();
        for host in &self.config.benchmark.azure_ping_hosts {
            let report = ping_host(host, self.config.benchmark.ping_count).await;
            pings.insert(format!("ping_{}", host), report);
        }

        let urls = self.config.data_sources.azure_blob.sas_download_urls.clone();
        let throughput = if urls.is_empty() {
            println!("  No Azure SAS URLs configured");
            Outcome::failed("No SAS URLs")
        } else {
            let settings = self.settings(self.config.benchmark.parallel_streams, link_speed);
            probe_http(Arc::clone(&self.fetcher), &urls, &settings, &mut self.net).await
        };

        AzureResults { pings, throughput }
    }
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(RULE));
    println!("{}", title);
    println!("{}", "=".repeat(RULE));
}

/// First `*.zgy` in `dir` by name, else the first regular file.
/// The error is the failure reason recorded in the results.
pub fn find_test_file(dir: &Path) -> std::result::Result<PathBuf, &'static str> {
    let entries = fs::read_dir(dir).map_err(|_| "Directory not found")?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let is_zgy = |p: &PathBuf| {
        p.extension()
            .map(|ext| ext.eq_ignore_ascii_case("zgy"))
            .unwrap_or(false)
    };

    files
        .iter()
        .find(|p| is_zgy(p))
        .or_else(|| files.first())
        .cloned()
        .ok_or("No test files")
}

/// Human-readable digest of a baseline run.
pub fn render_summary(results: &BaselineResults) -> String {
    Summary(results).to_string()
}

struct Summary<'a>(&'a BaselineResults);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.0;
        let rule = "-".repeat(RULE);

        writeln!(f, "{}", "=".repeat(RULE))?;
        writeln!(f, "FAST Bench - Baseline Summary")?;
        writeln!(f, "{}\n", "=".repeat(RULE))?;
        writeln!(f, "Timestamp: {}\n", results.timestamp)?;

        let m = &results.machine;
        writeln!(f, "MACHINE SPECS\n{}", rule)?;
        writeln!(f, "OS: {} {}", m.os, m.os_release)?;
        writeln!(
            f,
            "CPU: {} cores / {} threads @ {} MHz",
            m.cpu_count_physical, m.cpu_count_logical, m.cpu_freq_mhz
        )?;
        writeln!(f, "RAM: {:.1} GB total", m.ram_total_gb)?;
        writeln!(f, "GPU: {} device(s)", m.gpu_count)?;
        for gpu in &m.gpus {
            writeln!(f, "  - {} ({:.1} GB)", gpu.name, gpu.memory_gb)?;
        }
        for nic in &m.nics {
            writeln!(f, "NIC: {} ({} Mbps)", nic.name, nic.speed_mbps)?;
        }
        writeln!(f)?;

        writeln!(f, "NAS PERFORMANCE\n{}", rule)?;
        write_ping_line(f, "Ping", &results.nas.ping)?;
        write_throughput_line(f, &results.nas.throughput)?;
        writeln!(f)?;

        writeln!(f, "AZURE BLOB PERFORMANCE\n{}", rule)?;
        for report in results.azure.pings.values() {
            write_ping_line(f, &format!("Ping {}", report.host), report)?;
        }
        write_throughput_line(f, &results.azure.throughput)?;
        writeln!(f)
    }
}

fn write_ping_line(f: &mut fmt::Formatter<'_>, label: &str, report: &PingReport) -> fmt::Result {
    match report.rtt() {
        Some(rtt) => writeln!(
            f,
            "{}: {:.1}ms avg, {:.1}ms p95",
            label, rtt.avg_ms, rtt.p95_ms
        ),
        None => {
            let reason = report.outcome.error.as_deref().unwrap_or("unknown error");
            writeln!(f, "{}: failed ({})", label, reason)
        }
    }
}

fn write_throughput_line(
    f: &mut fmt::Formatter<'_>,
    throughput: &Outcome<crate::domain::model::ThroughputStats>,
) -> fmt::Result {
    match throughput.stats() {
        Some(tp) if tp.streams > 1 => writeln!(
            f,
            "Throughput: {:.1} MB/s ({} streams)",
            tp.throughput_mbs, tp.streams
        ),
        Some(tp) => writeln!(f, "Throughput: {:.1} MB/s", tp.throughput_mbs),
        None => {
            let reason = throughput.error.as_deref().unwrap_or("unknown error");
            writeln!(f, "Throughput: failed ({})", reason)
        }
    }
}

/// Writes `baseline.json`, `baseline_summary.txt` and, optionally, the charts.
pub async fn save_results(results: &BaselineResults, output_dir: &Path, charts: bool) -> Result<()> {
    let storage = LocalStorage::new(output_dir);

    let json = serde_json::to_vec_pretty(results)?;
    storage.write_file("baseline.json", &json).await?;
    println!("\nSaved: {}", storage.full_path("baseline.json").display());

    storage
        .write_file("baseline_summary.txt", render_summary(results).as_bytes())
        .await?;
    println!("Saved: {}", storage.full_path("baseline_summary.txt").display());

    if charts {
        write_charts(results, output_dir);
    }
    Ok(())
}

fn write_charts(results: &BaselineResults, output_dir: &Path) {
    let nas_tp = results.nas.throughput.stats();
    let azure_tp = results.azure.throughput.stats();
    if nas_tp.is_some() || azure_tp.is_some() {
        create_throughput_chart(
            nas_tp.map(|t| t.throughput_mbs).unwrap_or(0.0),
            azure_tp.map(|t| t.throughput_mbs).unwrap_or(0.0),
            &output_dir.join("throughput_comparison.txt"),
        );
    }

    let azure_rtt = results.azure.pings.values().find_map(|p| p.rtt());
    if let (Some(nas_rtt), Some(azure_rtt)) = (results.nas.ping.rtt(), azure_rtt) {
        create_latency_chart(nas_rtt, azure_rtt, &output_dir.join("latency_comparison.txt"));
    }
}
