use crate::domain::model::RttStats;

pub const MIB: f64 = 1024.0 * 1024.0;

/// Value at index `floor(p * n)` of an ascending-sorted slice, clamped to the
/// last element. Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Sorts in place, then takes the percentile.
pub fn percentile(values: &mut [f64], p: f64) -> Option<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(values, p)
}

pub fn rtt_stats(rtts: &[f64]) -> Option<RttStats> {
    if rtts.is_empty() {
        return None;
    }
    let mut sorted = rtts.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(RttStats {
        count: sorted.len(),
        min_ms: sorted[0],
        avg_ms: sorted.iter().sum::<f64>() / sorted.len() as f64,
        max_ms: sorted[sorted.len() - 1],
        p95_ms: percentile_sorted(&sorted, 0.95).unwrap_or(0.0),
    })
}

/// MiB per second; 0 when nothing was measured.
pub fn throughput_mbs(bytes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 / MIB) / elapsed_secs
}

/// Observed rate as a percentage of the link's advertised speed.
pub fn link_utilization_pct(observed_mbps: f64, link_speed_mbps: Option<u64>) -> Option<f64> {
    match link_speed_mbps {
        Some(speed) if speed > 0 => Some(observed_mbps / speed as f64 * 100.0),
        _ => None,
    }
}

/// p95 and p99 of per-chunk durations (seconds), reported in milliseconds.
pub fn chunk_percentiles_ms(chunk_secs: &mut [f64]) -> (f64, f64) {
    chunk_secs.sort_by(|a, b| a.total_cmp(b));
    let p95 = percentile_sorted(chunk_secs, 0.95).unwrap_or(0.0) * 1000.0;
    let p99 = percentile_sorted(chunk_secs, 0.99).unwrap_or(0.0) * 1000.0;
    (p95, p99)
}
