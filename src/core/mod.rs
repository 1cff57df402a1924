pub mod baseline;
pub mod machine;
pub mod metrics_agent;
pub mod ping;
pub mod stats;
pub mod throughput;
pub mod ui_attach;
pub mod workflows;

pub use baseline::BaselineProbe;
pub use metrics_agent::MetricsAgent;
