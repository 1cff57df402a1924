//! ~1 Hz process and host sampler writing one CSV row per tick.

use crate::core::stats::MIB;
use crate::domain::model::{MetricsSample, METRICS_COLUMNS};
use crate::domain::ports::GpuProbe;
use crate::utils::error::{BenchError, Result};
use crate::utils::files::ensure_dir;
use crate::utils::monitor::HostNetMonitor;
use crate::utils::timeutil::utc_iso8601;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::{Disks, Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Cumulative counters; rates are deltas between two of these.
#[derive(Debug, Clone, Copy)]
struct Counters {
    at: Instant,
    read_bytes: u64,
    write_bytes: u64,
    read_cnt: u64,
    write_cnt: u64,
    disk_read: u64,
    disk_write: u64,
    net_recv: u64,
    net_sent: u64,
}

fn rate(now: u64, before: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    now.saturating_sub(before) as f64 / secs
}

pub struct MetricsAgent {
    pid: Pid,
    system: System,
    disks: Disks,
    net: HostNetMonitor,
    gpu: Box<dyn GpuProbe>,
    previous: Option<Counters>,
}

impl MetricsAgent {
    /// Fails with `ProcessNotFoundError` if `pid` is not running.
    pub fn new(pid: u32, gpu: Box<dyn GpuProbe>) -> Result<Self> {
        let mut agent = Self {
            pid: Pid::from_u32(pid),
            system: System::new(),
            disks: Disks::new_with_refreshed_list(),
            net: HostNetMonitor::new(),
            gpu,
            previous: None,
        };
        if !agent.refresh_process() {
            return Err(BenchError::ProcessNotFoundError { pid });
        }
        Ok(agent)
    }

    pub fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    /// True while the target is alive and not a zombie.
    fn refresh_process(&mut self) -> bool {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_disk_usage(),
        );
        matches!(
            self.system.process(self.pid).map(|p| p.status()),
            Some(status) if status != ProcessStatus::Zombie && status != ProcessStatus::Dead
        )
    }

    fn disk_totals(&mut self) -> (u64, u64) {
        self.disks.refresh(true);
        self.disks.list().iter().fold((0, 0), |(r, w), disk| {
            let usage = disk.usage();
            (r + usage.total_read_bytes, w + usage.total_written_bytes)
        })
    }

    /// One row. Rates are 0 on the first call.
    pub fn collect_sample(&mut self) -> Result<MetricsSample> {
        if !self.refresh_process() {
            return Err(BenchError::ProcessNotFoundError {
                pid: self.pid.as_u32(),
            });
        }
        let Some(process) = self.system.process(self.pid) else {
            return Err(BenchError::ProcessNotFoundError {
                pid: self.pid.as_u32(),
            });
        };

        let cpu_pct = process.cpu_usage() as f64;
        let rss_mb = process.memory() as f64 / MIB;
        let vms_mb = process.virtual_memory() as f64 / MIB;
        let io = process.disk_usage();
        let (read_cnt, write_cnt) = io_call_counts(self.pid.as_u32());

        let (disk_read, disk_write) = self.disk_totals();
        let net = self.net.snapshot();

        let now = Counters {
            at: Instant::now(),
            read_bytes: io.total_read_bytes,
            write_bytes: io.total_written_bytes,
            read_cnt,
            write_cnt,
            disk_read,
            disk_write,
            net_recv: net.bytes_recv,
            net_sent: net.bytes_sent,
        };

        let mut sample = MetricsSample {
            ts: utc_iso8601(None),
            pid: self.pid.as_u32(),
            cpu_pct,
            rss_mb,
            vms_mb,
            open_zgy_paths: open_zgy_paths(self.pid.as_u32()).join(";"),
            ..MetricsSample::default()
        };

        if let Some(prev) = self.previous {
            let secs = now.at.duration_since(prev.at).as_secs_f64();
            sample.read_bytes_s = rate(now.read_bytes, prev.read_bytes, secs);
            sample.write_bytes_s = rate(now.write_bytes, prev.write_bytes, secs);
            sample.read_cnt_s = rate(now.read_cnt, prev.read_cnt, secs);
            sample.write_cnt_s = rate(now.write_cnt, prev.write_cnt, secs);
            sample.sys_disk_read_mb_s = rate(now.disk_read, prev.disk_read, secs) / MIB;
            sample.sys_disk_write_mb_s = rate(now.disk_write, prev.disk_write, secs) / MIB;
            sample.sys_net_recv_mb_s = rate(now.net_recv, prev.net_recv, secs) / MIB;
            sample.sys_net_sent_mb_s = rate(now.net_sent, prev.net_sent, secs) / MIB;
        }
        self.previous = Some(now);

        if let Some(gpu) = self.gpu.sample() {
            sample.gpu_util_pct = gpu.util_pct;
            sample.gpu_mem_used_mb = gpu.mem_used_mb;
            sample.gpu_mem_total_mb = gpu.mem_total_mb;
        }

        Ok(sample)
    }

    /// Samples until `duration` elapses, the process exits or Ctrl-C.
    /// Returns the number of rows written.
    pub async fn run(&mut self, output_csv: &Path, duration: Option<Duration>) -> Result<usize> {
        if let Some(parent) = output_csv.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(output_csv)?;
        writer.write_record(METRICS_COLUMNS)?;
        writer.flush()?;

        tracing::info!(
            pid = self.pid.as_u32(),
            output = %output_csv.display(),
            "Metrics agent started"
        );

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let start = Instant::now();
        let mut rows = 0usize;

        loop {
            if duration.is_some_and(|d| start.elapsed() >= d) {
                tracing::info!("Duration limit reached");
                break;
            }

            let tick = Instant::now();
            match self.collect_sample() {
                Ok(sample) => {
                    writer.serialize(&sample)?;
                    writer.flush()?;
                    rows += 1;
                }
                Err(BenchError::ProcessNotFoundError { pid }) => {
                    tracing::info!("Process {} exited, stopping", pid);
                    break;
                }
                Err(e) => tracing::warn!("Sample failed: {}", e),
            }

            let wait = SAMPLE_INTERVAL.saturating_sub(tick.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, stopping");
                    break;
                }
            }
        }

        writer.flush()?;
        tracing::info!(rows, "Metrics agent finished");
        Ok(rows)
    }
}

/// `(syscr, syscw)` from `/proc/<pid>/io`.
pub fn parse_proc_io(text: &str) -> (u64, u64) {
    let mut counts = (0, 0);
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().parse().unwrap_or(0);
        match key.trim() {
            "syscr" => counts.0 = value,
            "syscw" => counts.1 = value,
            _ => {}
        }
    }
    counts
}

#[cfg(target_os = "linux")]
fn io_call_counts(pid: u32) -> (u64, u64) {
    std::fs::read_to_string(format!("/proc/{}/io", pid))
        .map(|text| parse_proc_io(&text))
        .unwrap_or((0, 0))
}

#[cfg(not(target_os = "linux"))]
fn io_call_counts(_pid: u32) -> (u64, u64) {
    (0, 0)
}

fn is_zgy(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zgy"))
        .unwrap_or(false)
}

/// Open `.zgy` files of `pid`, sorted and deduplicated.
#[cfg(target_os = "linux")]
pub fn open_zgy_paths(pid: u32) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(format!("/proc/{}/fd", pid)) else {
        return Vec::new();
    };
    let mut paths: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| std::fs::read_link(e.path()).ok())
        .filter(|target| is_zgy(target))
        .map(|target| target.to_string_lossy().into_owned())
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

#[cfg(not(target_os = "linux"))]
pub fn open_zgy_paths(_pid: u32) -> Vec<String> {
    Vec::new()
}
