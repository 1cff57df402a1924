use crate::core::stats::rtt_stats;
use crate::domain::model::{Outcome, PingReport};
use std::time::Duration;
use tokio::process::Command;

const PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Pings `host` with `count` packets through the platform `ping` binary.
///
/// Never fails: spawn errors, timeouts, a non-zero exit status, or output
/// without RTT values all produce a failure record for the host.
pub async fn ping_host(host: &str, count: u32) -> PingReport {
    println!("\n  Pinging {} ({} packets)...", host, count);

    let count_flag = if cfg!(windows) { "-n" } else { "-c" };
    let mut cmd = Command::new("ping");
    cmd.args([count_flag, &count.to_string(), host]).kill_on_drop(true);

    let output = match tokio::time::timeout(PING_TIMEOUT, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!("Ping error for {}: {}", host, e);
            return failed(host, format!("Failed to run ping: {}", e));
        }
        Err(_) => {
            tracing::warn!("Ping to {} timed out", host);
            return failed(host, format!("Timed out after {}s", PING_TIMEOUT.as_secs()));
        }
    };

    if !output.status.success() {
        println!("    Ping failed");
        return failed(host, format!("ping exited with {}", output.status));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rtts = parse_rtts(&stdout);
    match rtt_stats(&rtts) {
        Some(stats) => {
            println!(
                "    RTT: min={:.1}ms avg={:.1}ms p95={:.1}ms",
                stats.min_ms, stats.avg_ms, stats.p95_ms
            );
            PingReport {
                host: host.to_string(),
                outcome: Outcome::ok(stats),
            }
        }
        None => {
            println!("    Could not parse RTT values");
            failed(host, "Could not parse RTT values")
        }
    }
}

fn failed(host: &str, error: impl Into<String>) -> PingReport {
    PingReport {
        host: host.to_string(),
        outcome: Outcome::failed(error),
    }
}

/// Extracts per-reply RTTs in milliseconds from `ping` output.
///
/// Handles `time=10.2 ms` (Linux/macOS), `time=10ms` and `time<1ms` (Windows).
pub fn parse_rtts(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| {
            let lower = line.to_lowercase();
            if !(lower.contains("time=") || lower.contains("time<")) {
                return None;
            }
            let tail = &lower[lower.rfind("time")? + "time".len()..];
            let value: String = tail
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            value.parse::<f64>().ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "\
PING nas01 (10.0.0.5) 56(84) bytes of data.
64 bytes from 10.0.0.5: icmp_seq=1 ttl=64 time=0.412 ms
64 bytes from 10.0.0.5: icmp_seq=2 ttl=64 time=0.388 ms
64 bytes from 10.0.0.5: icmp_seq=3 ttl=64 time=1.20 ms

--- nas01 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 0.388/0.666/1.200/0.377 ms
";

    const WINDOWS_OUTPUT: &str = "\
Pinging blob.core.windows.net [20.60.1.1] with 32 bytes of data:
Reply from 20.60.1.1: bytes=32 time=14ms TTL=115
Reply from 20.60.1.1: bytes=32 time<1ms TTL=115
Reply from 20.60.1.1: bytes=32 time=16ms TTL=115

Ping statistics for 20.60.1.1:
    Minimum = 0ms, Maximum = 16ms, Average = 10ms
";

    #[test]
    fn test_parse_linux_output() {
        let rtts = parse_rtts(LINUX_OUTPUT);
        // The summary line "time 2003ms" has no '=' or '<' and is skipped.
        assert_eq!(rtts, vec![0.412, 0.388, 1.20]);
    }

    #[test]
    fn test_parse_windows_output() {
        assert_eq!(parse_rtts(WINDOWS_OUTPUT), vec![14.0, 1.0, 16.0]);
    }

    #[test]
    fn test_parse_no_replies() {
        assert!(parse_rtts("Request timed out.\nRequest timed out.\n").is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_failure_record() {
        let report = ping_host("unreachable-host.invalid", 1).await;
        assert_eq!(report.host, "unreachable-host.invalid");
        assert!(!report.outcome.success);
        assert!(report.outcome.error.is_some());
        assert!(report.rtt().is_none());
    }
}
