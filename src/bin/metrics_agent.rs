use clap::Parser;
use fast_bench::config::cli::MetricsArgs;
use fast_bench::utils::logger;
use fast_bench::{default_gpu_probe, MetricsAgent};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let args = MetricsArgs::parse();
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let mut agent = match MetricsAgent::new(args.pid, default_gpu_probe()) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    println!("Monitoring PID {} -> {}", args.pid, args.output_csv.display());
    match args.duration {
        Some(secs) => println!("Duration: {}s", secs),
        None => println!("Duration: until the process exits (Ctrl-C to stop)"),
    }

    let duration = args.duration.map(Duration::from_secs);
    match agent.run(&args.output_csv, duration).await {
        Ok(rows) => println!("Wrote {} sample(s) to {}", rows, args.output_csv.display()),
        Err(e) => {
            tracing::error!(
                "❌ Metrics agent failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
