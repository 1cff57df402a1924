pub use crate::core::workflows::WorkflowKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "fast-bench")]
#[command(about = "Baseline probe: machine specs, NAS and Azure Blob latency/throughput ceilings")]
pub struct BaselineArgs {
    /// Path to YAML configuration file
    #[arg(default_value = "config/config.yaml")]
    pub config_path: PathBuf,

    /// Override benchmark.probe_duration_sec
    #[arg(long)]
    pub duration: Option<u64>,

    /// Skip writing text charts next to the results
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "metrics-agent")]
#[command(about = "Sample process metrics at ~1 Hz into a CSV file")]
pub struct MetricsArgs {
    /// Process ID to monitor
    pub pid: u32,

    /// Output CSV file path
    pub output_csv: PathBuf,

    /// Duration in seconds (default: run until the process exits or Ctrl-C)
    #[arg(long)]
    pub duration: Option<u64>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ui-attach")]
#[command(about = "Attach to the application window and optionally run a timed UI workflow")]
pub struct UiAttachArgs {
    /// Path to YAML configuration file
    #[arg(default_value = "config/config.yaml")]
    pub config_path: PathBuf,

    /// Seconds to wait for the main window
    #[arg(long, default_value = "180")]
    pub timeout: u64,

    /// Fail instead of launching the executable when no window is found
    #[arg(long)]
    pub no_launch: bool,

    /// Move and resize the window to LEFT,TOP,WIDTH,HEIGHT before running
    #[arg(long, value_parser = parse_window, allow_hyphen_values = true)]
    pub window: Option<[i32; 4]>,

    /// Workflows to run, in order
    #[arg(long, value_enum, value_delimiter = ',')]
    pub workflow: Vec<WorkflowKind>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses `LEFT,TOP,WIDTH,HEIGHT`; any other count is rejected.
fn parse_window(s: &str) -> Result<[i32; 4], String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid window value '{}': {}", part.trim(), e))
        })
        .collect::<Result<Vec<i32>, String>>()?;
    <[i32; 4]>::try_from(values)
        .map_err(|v| format!("expected LEFT,TOP,WIDTH,HEIGHT, got {} values", v.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_default_config_path() {
        let args = BaselineArgs::try_parse_from(["fast-bench"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config/config.yaml"));
        assert!(args.duration.is_none());
    }

    #[test]
    fn test_metrics_args() {
        let args = MetricsArgs::try_parse_from(["metrics-agent", "1234", "out.csv", "--duration", "60"])
            .unwrap();
        assert_eq!(args.pid, 1234);
        assert_eq!(args.output_csv, PathBuf::from("out.csv"));
        assert_eq!(args.duration, Some(60));
    }

    #[test]
    fn test_ui_attach_workflows_and_window() {
        let args = UiAttachArgs::try_parse_from([
            "ui-attach",
            "cfg.yaml",
            "--workflow",
            "scrub,export",
            "--window",
            "0,0,1920,1080",
        ])
        .unwrap();
        assert_eq!(args.workflow, vec![WorkflowKind::Scrub, WorkflowKind::Export]);
        assert_eq!(args.window, Some([0, 0, 1920, 1080]));
        assert_eq!(args.timeout, 180);
    }

    #[test]
    fn test_ui_attach_window_negative_offset() {
        let args =
            UiAttachArgs::try_parse_from(["ui-attach", "cfg.yaml", "--window", "-1920,0,1920,1080"])
                .unwrap();
        assert_eq!(args.window, Some([-1920, 0, 1920, 1080]));
    }

    #[test]
    fn test_ui_attach_window_wrong_count_is_rejected() {
        for bad in ["0,0,10", "0,0,10,10,5", "0,0,ten,10"] {
            let result = UiAttachArgs::try_parse_from(["ui-attach", "cfg.yaml", "--window", bad]);
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }
}
