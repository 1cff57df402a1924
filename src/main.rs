use clap::Parser;
use fast_bench::config::cli::BaselineArgs;
use fast_bench::core::baseline::save_results;
use fast_bench::utils::logger;
use fast_bench::{default_gpu_probe, load_config, BaselineProbe, BenchError, HttpRangeFetcher};
use std::sync::Arc;
use std::time::Duration;

fn fail(e: &BenchError) -> ! {
    tracing::error!(
        "❌ Baseline probe failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let args = BaselineArgs::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading configuration from: {}", args.config_path.display());
    let config = match load_config(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    tracing::info!("✅ Configuration loaded and validated");

    let fetcher = match HttpRangeFetcher::new() {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => fail(&e),
    };
    let output_dir = config.baseline_dir();

    let mut probe = BaselineProbe::new(config, fetcher, default_gpu_probe());
    if let Some(secs) = args.duration {
        tracing::info!("🔧 Probe duration overridden to {}s", secs);
        probe = probe.with_probe_duration(Duration::from_secs(secs));
    }

    let results = probe.run().await;

    if let Err(e) = save_results(&results, &output_dir, !args.no_charts).await {
        fail(&e);
    }

    println!("\n{}", "=".repeat(60));
    println!("Baseline Probe Complete!");
    println!("{}", "=".repeat(60));
    tracing::info!("📁 Results saved to: {}", output_dir.display());
}
