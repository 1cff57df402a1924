//! Fixed-width text bar charts written beside baseline results.
//!
//! Each chart is a plain `.txt` file so it can be attached to a ticket or
//! diffed between runs without an image viewer.

use std::fmt;
use std::path::Path;

use crate::domain::model::RttStats;
use crate::utils::error::Result;
use crate::utils::files::safe_write;

const BAR_WIDTH: usize = 50;

/// Renders one horizontal bar per `(label, value)` pair, scaled to the largest
/// value. Negative and non-finite values draw an empty bar.
pub fn render_bar_chart(title: &str, unit: &str, data: &[(String, f64)]) -> String {
    BarChart { title, unit, data }.to_string()
}

struct BarChart<'a> {
    title: &'a str,
    unit: &'a str,
    data: &'a [(String, f64)],
}

impl fmt::Display for BarChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count().max(10)))?;

        if self.data.is_empty() {
            return writeln!(f, "(no data)");
        }

        let label_width = self.data.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let max = self
            .data
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);

        for (label, value) in self.data {
            let filled = if max > 0.0 && value.is_finite() && *value > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "{:<lw$} | {}{} {:.1} {}",
                label,
                "#".repeat(filled),
                " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
                value,
                self.unit,
                lw = label_width
            )?;
        }
        Ok(())
    }
}

fn write_chart(output_path: &Path, chart: &str) -> bool {
    match safe_write(output_path, chart.as_bytes()) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Chart generation failed for {}: {}", output_path.display(), e);
            false
        }
    }
}

pub fn create_throughput_chart(nas_mbs: f64, azure_mbs: f64, output_path: &Path) -> bool {
    let data = vec![("NAS".to_string(), nas_mbs), ("Azure Blob".to_string(), azure_mbs)];
    write_chart(
        output_path,
        &render_bar_chart("Storage Throughput Comparison", "MB/s", &data),
    )
}

pub fn create_latency_chart(nas: &RttStats, azure: &RttStats, output_path: &Path) -> bool {
    let data = vec![
        ("NAS min".to_string(), nas.min_ms),
        ("NAS avg".to_string(), nas.avg_ms),
        ("NAS p95".to_string(), nas.p95_ms),
        ("Azure min".to_string(), azure.min_ms),
        ("Azure avg".to_string(), azure.avg_ms),
        ("Azure p95".to_string(), azure.p95_ms),
    ];
    write_chart(
        output_path,
        &render_bar_chart("Network Latency Comparison", "ms", &data),
    )
}

pub fn create_comparison_chart(
    data: &[(String, f64)],
    title: &str,
    unit: &str,
    output_path: &Path,
) -> Result<()> {
    safe_write(output_path, render_bar_chart(title, unit, data).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_value_fills_the_bar() {
        let data = vec![("NAS".to_string(), 50.0), ("Azure Blob".to_string(), 100.0)];
        let chart = render_bar_chart("Throughput", "MB/s", &data);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Throughput");
        assert!(lines[2].starts_with("NAS        | "));
        assert_eq!(lines[2].matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(lines[3].matches('#').count(), BAR_WIDTH);
        assert!(lines[3].ends_with("100.0 MB/s"));
    }

    #[test]
    fn test_zero_and_nan_values_draw_empty_bars() {
        let data = vec![("a".to_string(), 0.0), ("b".to_string(), f64::NAN)];
        let chart = render_bar_chart("t", "ms", &data);
        assert_eq!(chart.matches('#').count(), 0);
    }

    #[test]
    fn test_empty_chart() {
        assert!(render_bar_chart("t", "ms", &[]).contains("(no data)"));
    }

    #[test]
    fn test_charts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("throughput.txt");
        assert!(create_throughput_chart(120.0, 80.0, &path));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Azure Blob"));

        let cmp = dir.path().join("cmp.txt");
        create_comparison_chart(&[("scrub".to_string(), 4.2)], "Workflow time", "s", &cmp).unwrap();
        assert!(std::fs::read_to_string(&cmp).unwrap().contains("Workflow time"));

        let missing_dir = dir.path().join("nope").join("chart.txt");
        assert!(!create_throughput_chart(1.0, 1.0, &missing_dir));
    }
}
