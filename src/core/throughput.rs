//! Timed chunked-read probes against files and ranged HTTP endpoints.

use crate::core::stats::{chunk_percentiles_ms, link_utilization_pct, throughput_mbs, MIB};
use crate::domain::model::{Outcome, ThroughputStats};
use crate::domain::ports::{RangeFetcher, RangeResponse};
use crate::utils::error::{BenchError, Result};
use crate::utils::files::file_size_mb;
use crate::utils::monitor::{HostNetMonitor, NetCounters};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Ranged GETs rotate through the first 100 MiB of each blob.
pub const ROTATION_WINDOW: u64 = 100 * 1024 * 1024;

/// Bounded wait for in-flight requests after the deadline.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub chunk_size: u64,
    pub duration: Duration,
    pub streams: usize,
    pub link_speed_mbps: Option<u64>,
    pub drain_timeout: Duration,
}

impl ProbeSettings {
    pub fn new(chunk_size: u64, duration: Duration) -> Self {
        Self {
            chunk_size,
            duration,
            streams: 1,
            link_speed_mbps: None,
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    pub fn with_streams(mut self, streams: usize) -> Self {
        self.streams = streams.max(1);
        self
    }

    pub fn with_link_speed(mut self, link_speed_mbps: Option<u64>) -> Self {
        self.link_speed_mbps = link_speed_mbps;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

/// Raw measurements of one timed transfer.
#[derive(Debug, Clone, Default)]
pub struct Transfer {
    pub bytes: u64,
    pub chunk_secs: Vec<f64>,
    pub elapsed_secs: f64,
}

impl Transfer {
    fn record(&mut self, bytes: u64, secs: f64) {
        self.bytes += bytes;
        self.chunk_secs.push(secs);
    }

    fn into_stats(mut self, net: NetCounters, settings: &ProbeSettings) -> ThroughputStats {
        let (p95, p99) = chunk_percentiles_ms(&mut self.chunk_secs);
        let network_bandwidth_mbs = if self.elapsed_secs > 0.0 {
            (net.bytes_recv as f64 / MIB) / self.elapsed_secs
        } else {
            0.0
        };
        let network_bandwidth_mbps = network_bandwidth_mbs * 8.0;

        ThroughputStats {
            duration_sec: self.elapsed_secs,
            bytes_read: self.bytes,
            throughput_mbs: throughput_mbs(self.bytes, self.elapsed_secs),
            network_bandwidth_mbs,
            network_bandwidth_mbps,
            link_utilization_pct: link_utilization_pct(
                network_bandwidth_mbps,
                settings.link_speed_mbps,
            ),
            chunk_count: self.chunk_secs.len(),
            chunk_time_p95_ms: p95,
            chunk_time_p99_ms: p99,
            streams: settings.streams,
        }
    }
}

/// Fills `buf` unless EOF comes first; returns the number of bytes read.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads `chunk_size` chunks until `duration` has elapsed, seeking back to the
/// start on end-of-file.
pub fn read_cyclic<R: Read + Seek>(
    reader: &mut R,
    chunk_size: usize,
    duration: Duration,
) -> Result<Transfer> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut transfer = Transfer::default();
    let mut since_rewind = 0u64;
    let start = Instant::now();

    while start.elapsed() < duration {
        let chunk_start = Instant::now();
        let n = read_chunk(reader, &mut buf)?;
        let chunk_secs = chunk_start.elapsed().as_secs_f64();

        if n == 0 {
            if since_rewind == 0 {
                return Err(BenchError::probe("Test file is empty"));
            }
            reader.seek(SeekFrom::Start(0))?;
            since_rewind = 0;
            continue;
        }

        since_rewind += n as u64;
        transfer.record(n as u64, chunk_secs);
    }

    transfer.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(transfer)
}

/// Read throughput of a local or NAS-mounted file.
pub async fn probe_file(
    path: &Path,
    settings: &ProbeSettings,
    net: &mut HostNetMonitor,
) -> Outcome<ThroughputStats> {
    println!("\n  Testing NAS throughput: {}", path.display());

    if !path.exists() {
        println!("    Test file not found, skipping");
        return Outcome::failed("File not found");
    }
    if let Ok(size_mb) = file_size_mb(path) {
        println!("    File size: {:.1} MB", size_mb);
    }

    let net_start = net.snapshot();
    let owned: PathBuf = path.to_path_buf();
    let chunk_size = settings.chunk_size as usize;
    let duration = settings.duration;

    let joined = tokio::task::spawn_blocking(move || -> Result<Transfer> {
        let mut file = File::open(&owned)?;
        read_cyclic(&mut file, chunk_size, duration)
    })
    .await;

    let transfer = match joined {
        Ok(Ok(transfer)) => transfer,
        Ok(Err(e)) => return report_failure(e.to_string()),
        Err(e) => return report_failure(format!("Read task failed: {}", e)),
    };

    let net_delta = net.snapshot().delta_since(&net_start);
    report_success(transfer.into_stats(net_delta, settings))
}

/// Byte range for the `index`-th request (1-based).
pub fn range_for(index: u64, chunk_size: u64) -> (u64, u64) {
    let start = ((index % ROTATION_WINDOW) * (chunk_size % ROTATION_WINDOW)) % ROTATION_WINDOW;
    (start, start.saturating_add(chunk_size.max(1) - 1))
}

fn record_response(transfer: &mut Transfer, response: RangeResponse, secs: f64) {
    if response.is_counted() {
        transfer.record(response.bytes, secs);
    } else {
        println!("    HTTP {}", response.status);
        tracing::warn!("Ranged GET returned HTTP {}", response.status);
    }
}

/// One request at a time, round-robin over `urls`.
pub async fn fetch_sequential(
    fetcher: &dyn RangeFetcher,
    urls: &[String],
    chunk_size: u64,
    duration: Duration,
) -> Result<Transfer> {
    if urls.is_empty() {
        return Err(BenchError::probe("No SAS URLs"));
    }

    let mut transfer = Transfer::default();
    let mut index = 0u64;
    let start = Instant::now();

    while start.elapsed() < duration {
        let url = &urls[(index % urls.len() as u64) as usize];
        index += 1;
        let (range_start, range_end) = range_for(index, chunk_size);

        let chunk_start = Instant::now();
        let response = fetcher.fetch_range(url, range_start, range_end).await?;
        record_response(&mut transfer, response, chunk_start.elapsed().as_secs_f64());
    }

    transfer.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(transfer)
}

type Completion = (f64, Result<RangeResponse>);

/// Keeps up to `streams` requests in flight until the deadline, then waits up
/// to `drain_timeout` for the stragglers and aborts whatever is left.
pub async fn fetch_parallel(
    fetcher: Arc<dyn RangeFetcher>,
    urls: &[String],
    chunk_size: u64,
    duration: Duration,
    streams: usize,
    drain_timeout: Duration,
) -> Result<Transfer> {
    if urls.is_empty() {
        return Err(BenchError::probe("No SAS URLs"));
    }

    let streams = streams.max(1);
    let mut in_flight: JoinSet<Completion> = JoinSet::new();
    let mut transfer = Transfer::default();
    let mut index = 0u64;
    let start = Instant::now();
    let deadline = start + duration;

    loop {
        while in_flight.len() < streams && Instant::now() < deadline {
            let url = urls[(index % urls.len() as u64) as usize].clone();
            index += 1;
            let (range_start, range_end) = range_for(index, chunk_size);
            let fetcher = Arc::clone(&fetcher);

            in_flight.spawn(async move {
                let chunk_start = Instant::now();
                let response = fetcher.fetch_range(&url, range_start, range_end).await;
                (chunk_start.elapsed().as_secs_f64(), response)
            });
        }

        let next = tokio::time::timeout_at(
            tokio::time::Instant::from_std(deadline),
            in_flight.join_next(),
        )
        .await;
        match next {
            Ok(Some(joined)) => {
                let (secs, response) =
                    joined.map_err(|e| BenchError::probe(format!("Request task failed: {}", e)))?;
                record_response(&mut transfer, response?, secs);
            }
            // Nothing in flight, or the deadline passed while waiting.
            Ok(None) | Err(_) => break,
        }

        if Instant::now() >= deadline {
            break;
        }
    }

    let drained = tokio::time::timeout(drain_timeout, async {
        while let Some(joined) = in_flight.join_next().await {
            let (secs, response) =
                joined.map_err(|e| BenchError::probe(format!("Request task failed: {}", e)))?;
            record_response(&mut transfer, response?, secs);
        }
        Ok::<(), BenchError>(())
    })
    .await;

    match drained {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!(
                "{} request(s) still in flight after {:?}, aborting",
                in_flight.len(),
                drain_timeout
            );
            in_flight.abort_all();
        }
    }

    transfer.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(transfer)
}

/// Blob throughput via ranged GETs; parallel when `settings.streams > 1`.
pub async fn probe_http(
    fetcher: Arc<dyn RangeFetcher>,
    urls: &[String],
    settings: &ProbeSettings,
    net: &mut HostNetMonitor,
) -> Outcome<ThroughputStats> {
    println!(
        "\n  Testing Azure Blob throughput ({} URLs, {} stream(s))",
        urls.len(),
        settings.streams
    );

    if urls.is_empty() {
        println!("    No SAS URLs configured, skipping");
        return Outcome::failed("No SAS URLs");
    }

    let net_start = net.snapshot();
    let result = if settings.streams > 1 {
        fetch_parallel(
            fetcher,
            urls,
            settings.chunk_size,
            settings.duration,
            settings.streams,
            settings.drain_timeout,
        )
        .await
    } else {
        fetch_sequential(fetcher.as_ref(), urls, settings.chunk_size, settings.duration).await
    };

    match result {
        Ok(transfer) => {
            let net_delta = net.snapshot().delta_since(&net_start);
            report_success(transfer.into_stats(net_delta, settings))
        }
        Err(e) => report_failure(e.to_string()),
    }
}

fn report_success(stats: ThroughputStats) -> Outcome<ThroughputStats> {
    println!(
        "    Throughput: {:.1} MB/s ({:.0} Mbps network)",
        stats.throughput_mbs, stats.network_bandwidth_mbps
    );
    println!(
        "    Chunk times: p95={:.1}ms p99={:.1}ms",
        stats.chunk_time_p95_ms, stats.chunk_time_p99_ms
    );
    if let Some(util) = stats.link_utilization_pct {
        println!("    Link utilization: {:.1}%", util);
    }
    Outcome::ok(stats)
}

fn report_failure(error: String) -> Outcome<ThroughputStats> {
    println!("    Error: {}", error);
    tracing::warn!("Throughput probe failed: {}", error);
    Outcome::failed(error)
}
