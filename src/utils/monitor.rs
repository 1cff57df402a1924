use serde::Serialize;
use sysinfo::Networks;

/// Cumulative host-wide network byte counters, loopback excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetCounters {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

impl NetCounters {
    pub fn delta_since(&self, earlier: &NetCounters) -> NetCounters {
        NetCounters {
            bytes_recv: self.bytes_recv.saturating_sub(earlier.bytes_recv),
            bytes_sent: self.bytes_sent.saturating_sub(earlier.bytes_sent),
        }
    }
}

pub struct HostNetMonitor {
    networks: Networks,
}

impl HostNetMonitor {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }

    pub fn snapshot(&mut self) -> NetCounters {
        self.networks.refresh(true);

        self.networks
            .iter()
            .filter(|(name, _)| !is_loopback(name))
            .fold(NetCounters::default(), |acc, (_, data)| NetCounters {
                bytes_recv: acc.bytes_recv + data.total_received(),
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
            })
    }
}

impl Default for HostNetMonitor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_loopback(interface: &str) -> bool {
    let lower = interface.to_lowercase();
    lower == "lo" || lower.starts_with("lo0") || lower.contains("loopback")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_saturates_on_counter_reset() {
        let before = NetCounters {
            bytes_recv: 1_000,
            bytes_sent: 50,
        };
        let after = NetCounters {
            bytes_recv: 4_000,
            bytes_sent: 10,
        };
        let delta = after.delta_since(&before);
        assert_eq!(delta.bytes_recv, 3_000);
        assert_eq!(delta.bytes_sent, 0);
    }

    #[test]
    fn test_loopback_names() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(is_loopback("Loopback Pseudo-Interface 1"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("Ethernet 2"));
    }

    #[test]
    fn test_snapshot_is_monotonic() {
        let mut monitor = HostNetMonitor::new();
        let first = monitor.snapshot();
        let second = monitor.snapshot();
        assert!(second.bytes_recv >= first.bytes_recv);
    }
}
