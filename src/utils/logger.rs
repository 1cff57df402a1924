use tracing::Subscriber;
use tracing_subscriber::fmt::{self, format::DefaultFields, format::Format};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type StderrLayer<S> = fmt::Layer<S, DefaultFields, Format, fn() -> std::io::Stderr>;

/// `RUST_LOG` wins over `default_directives`.
fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Log lines go to stderr so stdout stays free for reports.
fn stderr_layer<S>() -> StderrLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr as fn() -> std::io::Stderr)
}

pub fn init_cli_logger(verbose: bool) {
    let directives = if verbose {
        "fast_bench=debug,info"
    } else {
        "fast_bench=info"
    };

    tracing_subscriber::registry()
        .with(env_filter(directives))
        .with(stderr_layer().compact())
        .init();
}

/// JSON lines on stderr, for runs driven by another harness that parses logs.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter("fast_bench=info"))
        .with(stderr_layer().json())
        .init();
}
