use serde::Serialize;
use std::collections::BTreeMap;

/// Result of one probe: either its statistics flattened next to
/// `success: true`, or `success: false` with an error message.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub stats: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(stats: T) -> Self {
        Self {
            success: true,
            error: None,
            stats: Some(stats),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            stats: None,
        }
    }

    pub fn stats(&self) -> Option<&T> {
        self.stats.as_ref()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GpuInfo {
    pub name: String,
    pub memory_gb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NicInfo {
    pub name: String,
    pub speed_mbps: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineSpecs {
    pub os: String,
    pub os_version: String,
    pub os_release: String,
    pub machine: String,
    pub processor: String,
    pub cpu_count_physical: usize,
    pub cpu_count_logical: usize,
    pub cpu_freq_mhz: u64,
    pub ram_total_gb: f64,
    pub ram_available_gb: f64,
    pub gpu_count: usize,
    pub gpus: Vec<GpuInfo>,
    pub nics: Vec<NicInfo>,
}

impl MachineSpecs {
    /// Fastest detected link, used as the denominator for link utilization.
    pub fn max_link_speed_mbps(&self) -> Option<u64> {
        self.nics.iter().map(|n| n.speed_mbps).filter(|s| *s > 0).max()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RttStats {
    pub count: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub host: String,
    #[serde(flatten)]
    pub outcome: Outcome<RttStats>,
}

impl PingReport {
    pub fn rtt(&self) -> Option<&RttStats> {
        self.outcome.stats()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputStats {
    pub duration_sec: f64,
    pub bytes_read: u64,
    pub throughput_mbs: f64,
    pub network_bandwidth_mbs: f64,
    pub network_bandwidth_mbps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_utilization_pct: Option<f64>,
    pub chunk_count: usize,
    pub chunk_time_p95_ms: f64,
    pub chunk_time_p99_ms: f64,
    pub streams: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NasResults {
    pub ping: PingReport,
    pub throughput: Outcome<ThroughputStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AzureResults {
    /// Keyed `ping_<host>`.
    #[serde(flatten)]
    pub pings: BTreeMap<String, PingReport>,
    pub throughput: Outcome<ThroughputStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaselineResults {
    pub timestamp: String,
    pub machine: MachineSpecs,
    pub nas: NasResults,
    pub azure: AzureResults,
}

/// One CSV row of the metrics agent. Field order is the column order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSample {
    pub ts: String,
    pub pid: u32,
    pub cpu_pct: f64,
    pub rss_mb: f64,
    pub vms_mb: f64,
    pub read_bytes_s: f64,
    pub write_bytes_s: f64,
    pub read_cnt_s: f64,
    pub write_cnt_s: f64,
    pub sys_disk_read_mb_s: f64,
    pub sys_disk_write_mb_s: f64,
    pub sys_net_recv_mb_s: f64,
    pub sys_net_sent_mb_s: f64,
    pub gpu_util_pct: f64,
    pub gpu_mem_used_mb: f64,
    pub gpu_mem_total_mb: f64,
    pub fast_req_latency_ms: f64,
    pub fast_req_bytes: f64,
    pub fast_req_cache_hit: u8,
    pub open_zgy_paths: String,
}

pub const METRICS_COLUMNS: [&str; 20] = [
    "ts",
    "pid",
    "cpu_pct",
    "rss_mb",
    "vms_mb",
    "read_bytes_s",
    "write_bytes_s",
    "read_cnt_s",
    "write_cnt_s",
    "sys_disk_read_mb_s",
    "sys_disk_write_mb_s",
    "sys_net_recv_mb_s",
    "sys_net_sent_mb_s",
    "gpu_util_pct",
    "gpu_mem_used_mb",
    "gpu_mem_total_mb",
    "fast_req_latency_ms",
    "fast_req_bytes",
    "fast_req_cache_hit",
    "open_zgy_paths",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpuSample {
    pub util_pct: f64,
    pub mem_used_mb: f64,
    pub mem_total_mb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub name: String,
    pub started_at: String,
    pub steps: usize,
    pub total_sec: f64,
    pub step_avg_ms: f64,
    pub step_p95_ms: f64,
}
