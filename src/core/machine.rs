use crate::domain::model::{MachineSpecs, NicInfo};
use crate::domain::ports::GpuProbe;
use std::path::Path;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn collect_machine_specs(gpu: &dyn GpuProbe) -> MachineSpecs {
    println!("\n{}", "=".repeat(60));
    println!("Collecting Machine Specifications");
    println!("{}", "=".repeat(60));

    let system = System::new_with_specifics(
        RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything()),
    );

    let cpus = system.cpus();
    let cpu_count_logical = cpus.len();
    let cpu_count_physical = System::physical_core_count().unwrap_or(cpu_count_logical);
    let cpu_freq_mhz = cpus.first().map(|cpu| cpu.frequency()).unwrap_or(0);
    let processor = cpus
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default();

    println!(
        "  CPU: {} cores ({} threads)",
        cpu_count_physical, cpu_count_logical
    );
    println!("  Frequency: {} MHz", cpu_freq_mhz);

    let ram_total_gb = system.total_memory() as f64 / GIB;
    let ram_available_gb = system.available_memory() as f64 / GIB;
    println!(
        "  RAM: {:.1} GB total, {:.1} GB available",
        ram_total_gb, ram_available_gb
    );

    let gpus = gpu.devices();
    for (i, g) in gpus.iter().enumerate() {
        println!("  GPU {}: {} ({:.1} GB)", i, g.name, g.memory_gb);
    }

    let nics = detect_nics();
    for nic in &nics {
        println!("  NIC: {} ({} Mbps)", nic.name, nic.speed_mbps);
    }

    MachineSpecs {
        os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
        os_version: System::os_version().unwrap_or_default(),
        os_release: System::kernel_version().unwrap_or_default(),
        machine: std::env::consts::ARCH.to_string(),
        processor,
        cpu_count_physical,
        cpu_count_logical,
        cpu_freq_mhz,
        ram_total_gb,
        ram_available_gb,
        gpu_count: gpus.len(),
        gpus,
        nics,
    }
}

/// Interfaces that are up, with their link speed (0 when unknown).
pub fn detect_nics() -> Vec<NicInfo> {
    #[cfg(windows)]
    {
        match windows_nics() {
            Ok(nics) => nics,
            Err(e) => {
                tracing::warn!("NIC detection failed: {}", e);
                Vec::new()
            }
        }
    }

    #[cfg(not(windows))]
    {
        read_sysfs_nics(Path::new("/sys/class/net"))
    }
}

/// Reads `<root>/<iface>/{operstate,speed}` as laid out by Linux sysfs.
pub fn read_sysfs_nics(root: &Path) -> Vec<NicInfo> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut nics: Vec<NicInfo> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if crate::utils::monitor::is_loopback(&name) {
                return None;
            }
            let dir = entry.path();
            let state = std::fs::read_to_string(dir.join("operstate")).ok()?;
            if state.trim() != "up" {
                return None;
            }
            // Wireless and virtual links report -1 or fail with EINVAL.
            let speed_mbps = std::fs::read_to_string(dir.join("speed"))
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|s| *s > 0)
                .map(|s| s as u64)
                .unwrap_or(0);
            Some(NicInfo { name, speed_mbps })
        })
        .collect();

    nics.sort_by(|a, b| a.name.cmp(&b.name));
    nics
}

#[cfg(windows)]
fn windows_nics() -> crate::utils::error::Result<Vec<NicInfo>> {
    use crate::utils::error::BenchError;
    use std::process::Command;

    let output = Command::new("powershell")
        .args([
            "-NoProfile",
            "-Command",
            "Get-NetAdapter | Where-Object {$_.Status -eq 'Up'} | Select-Object Name, LinkSpeed | ConvertTo-Json",
        ])
        .output()?;

    let output_str = String::from_utf8_lossy(&output.stdout);
    if output_str.trim().is_empty() {
        return Ok(Vec::new());
    }
    let json_value: serde_json::Value = serde_json::from_str(&output_str)
        .map_err(|e| BenchError::probe(format!("Failed to parse Get-NetAdapter output: {}", e)))?;

    // A single adapter is emitted as an object rather than an array.
    let adapters = match json_value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    Ok(adapters
        .iter()
        .filter_map(|adapter| {
            let name = adapter["Name"].as_str()?.to_string();
            let speed_mbps = parse_link_speed(adapter["LinkSpeed"].as_str().unwrap_or(""))
                .unwrap_or(0);
            Some(NicInfo { name, speed_mbps })
        })
        .collect())
}

/// Parses link speed strings such as `"2.5 Gbps"` or `"100 Mbps"` into Mbps.
pub fn parse_link_speed(link_speed: &str) -> Option<u64> {
    let speed = link_speed.trim().to_lowercase();

    if let Some(value) = speed.strip_suffix("gbps") {
        let gbps: f64 = value.trim().parse().ok()?;
        Some((gbps * 1000.0).round() as u64)
    } else if let Some(value) = speed.strip_suffix("mbps") {
        let mbps: f64 = value.trim().parse().ok()?;
        Some(mbps.round() as u64)
    } else if let Some(value) = speed.strip_suffix("kbps") {
        let kbps: f64 = value.trim().parse().ok()?;
        Some((kbps / 1000.0).round() as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gpu::NoGpu;
    use std::fs;

    #[test]
    fn test_parse_link_speed() {
        assert_eq!(parse_link_speed("2.5 Gbps"), Some(2500));
        assert_eq!(parse_link_speed("10 Gbps"), Some(10_000));
        assert_eq!(parse_link_speed("100 Mbps"), Some(100));
        assert_eq!(parse_link_speed("866.7 Mbps"), Some(867));
        assert_eq!(parse_link_speed(""), None);
        assert_eq!(parse_link_speed("fast"), None);
    }

    #[test]
    fn test_read_sysfs_nics() {
        let root = tempfile::tempdir().unwrap();
        let add = |name: &str, state: &str, speed: Option<&str>| {
            let dir = root.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("operstate"), format!("{}\n", state)).unwrap();
            if let Some(speed) = speed {
                fs::write(dir.join("speed"), format!("{}\n", speed)).unwrap();
            }
        };
        add("lo", "unknown", None);
        add("eth0", "up", Some("10000"));
        add("eth1", "down", Some("1000"));
        add("wlan0", "up", Some("-1"));

        let nics = read_sysfs_nics(root.path());
        assert_eq!(nics.len(), 2);
        assert_eq!(nics[0].name, "eth0");
        assert_eq!(nics[0].speed_mbps, 10_000);
        assert_eq!(nics[1].name, "wlan0");
        assert_eq!(nics[1].speed_mbps, 0);
    }

    #[test]
    fn test_missing_sysfs_root_yields_no_nics() {
        assert!(read_sysfs_nics(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn test_collect_machine_specs_basic_invariants() {
        let specs = collect_machine_specs(&NoGpu);
        assert!(specs.cpu_count_logical >= 1);
        assert!(specs.cpu_count_physical >= 1);
        assert!(specs.ram_total_gb > 0.0);
        assert_eq!(specs.gpu_count, 0);
        assert!(!specs.machine.is_empty());
    }
}
