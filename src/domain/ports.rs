use crate::core::ui_attach::WindowRect;
use crate::core::workflows::Hotkey;
use crate::domain::model::{GpuInfo, GpuSample};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Response of a single ranged GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeResponse {
    pub status: u16,
    pub bytes: u64,
}

impl RangeResponse {
    /// 200 for servers that ignore `Range`, 206 for partial content.
    pub fn is_counted(&self) -> bool {
        self.status == 200 || self.status == 206
    }
}

#[async_trait]
pub trait RangeFetcher: Send + Sync {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<RangeResponse>;
}

pub trait GpuProbe: Send + Sync {
    fn devices(&self) -> Vec<GpuInfo>;
    fn sample(&self) -> Option<GpuSample>;
}

/// Drives an attached application window.
pub trait UiDriver {
    fn ensure_foreground(&self) -> Result<()>;
    fn window_rect(&self) -> Result<WindowRect>;
    fn set_window_rect(&self, left: i32, top: i32, width: i32, height: i32) -> Result<()>;
    fn send_hotkey(&self, hotkey: &Hotkey) -> Result<()>;
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
