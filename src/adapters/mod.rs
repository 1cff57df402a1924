// Adapters layer: concrete implementations of the domain ports.

pub mod gpu;
pub mod http;
pub mod storage;
#[cfg(windows)]
pub mod win32;

pub use gpu::default_gpu_probe;
pub use http::HttpRangeFetcher;
pub use storage::LocalStorage;
