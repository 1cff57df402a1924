use clap::Parser;
use fast_bench::config::cli::UiAttachArgs;
use fast_bench::core::ui_attach::{attach_app, get_window_rect, set_window_rect, AttachOptions};
use fast_bench::core::workflows::{run_workflow, save_workflow_result};
use fast_bench::utils::charts::create_comparison_chart;
use fast_bench::utils::logger;
use fast_bench::{load_config, BenchError};
use std::time::Duration;

fn fail(e: &BenchError) -> ! {
    tracing::error!(
        "❌ UI attach failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn main() {
    let args = UiAttachArgs::parse();
    logger::init_cli_logger(args.verbose);

    let config = match load_config(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let mut options = AttachOptions::new(&config.app.exe_path, config.app.window_title.clone());
    options.exclude_titles = config.app.exclude_titles.clone();
    options.timeout = Duration::from_secs(args.timeout);
    options.launch_if_not_found = !args.no_launch;
    if config.app.project_arg_supported {
        options.args.push(config.paths.project_shared_zgy_local.clone().into_os_string());
    }

    let window = attach_app(&options).unwrap_or_else(|e| fail(&e));

    if let Some([left, top, width, height]) = args.window {
        set_window_rect(window.as_ref(), left, top, width, height);
    }
    match get_window_rect(window.as_ref()) {
        Ok(rect) => println!(
            "Attached: {}x{} at ({}, {})",
            rect.width(),
            rect.height(),
            rect.left,
            rect.top
        ),
        Err(e) => tracing::warn!("Could not read window rect: {}", e),
    }

    let ui_dir = config.ui_dir();
    let mut timings = Vec::new();
    for kind in &args.workflow {
        let result = run_workflow(*kind, window.as_ref(), &config).unwrap_or_else(|e| fail(&e));
        println!(
            "{}: {} step(s) in {:.2}s (p95 {:.1}ms)",
            result.name, result.steps, result.total_sec, result.step_p95_ms
        );
        if let Err(e) = save_workflow_result(&result, &ui_dir) {
            fail(&e);
        }
        timings.push((result.name.clone(), result.total_sec));
    }

    if timings.len() > 1 {
        let chart = ui_dir.join("workflow_times.txt");
        if let Err(e) = create_comparison_chart(&timings, "Workflow Duration", "s", &chart) {
            tracing::warn!("Chart generation failed: {}", e);
        }
    }
}
