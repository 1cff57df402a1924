//! Locating, launching and placing the application's main window.

use crate::domain::ports::UiDriver;
use crate::utils::error::{BenchError, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(180);
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Screen rectangle in pixels; `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Absolute screen point to fractions of the window; 0 on a degenerate axis.
pub fn to_rel(x: i32, y: i32, rect: &WindowRect) -> (f64, f64) {
    let (w, h) = (rect.width(), rect.height());
    let rx = if w != 0 {
        (x - rect.left) as f64 / w as f64
    } else {
        0.0
    };
    let ry = if h != 0 {
        (y - rect.top) as f64 / h as f64
    } else {
        0.0
    };
    (rx, ry)
}

/// Fractions of the window back to an absolute point, truncated toward zero.
pub fn to_abs(rx: f64, ry: f64, rect: &WindowRect) -> (i32, i32) {
    let x = rect.left + (rx * rect.width() as f64) as i32;
    let y = rect.top + (ry * rect.height() as f64) as i32;
    (x, y)
}

/// First window whose title contains `pattern` and none of `excludes`.
/// Both comparisons ignore case.
pub fn select_window<H: Copy>(
    windows: &[(H, String)],
    pattern: &str,
    excludes: &[String],
) -> Option<H> {
    let pattern = pattern.to_lowercase();
    let excludes: Vec<String> = excludes.iter().map(|e| e.to_lowercase()).collect();

    windows
        .iter()
        .find(|(_, title)| {
            let title = title.to_lowercase();
            !title.is_empty()
                && title.contains(&pattern)
                && !excludes.iter().any(|e| !e.is_empty() && title.contains(e))
        })
        .map(|(handle, _)| *handle)
}

#[derive(Debug, Clone)]
pub struct AttachOptions {
    pub exe_path: PathBuf,
    pub args: Vec<OsString>,
    pub window_title: String,
    pub exclude_titles: Vec<String>,
    pub timeout: Duration,
    pub launch_if_not_found: bool,
    pub poll_interval: Duration,
}

impl AttachOptions {
    pub fn new(exe_path: impl Into<PathBuf>, window_title: impl Into<String>) -> Self {
        Self {
            exe_path: exe_path.into(),
            args: Vec::new(),
            window_title: window_title.into(),
            exclude_titles: Vec::new(),
            timeout: DEFAULT_ATTACH_TIMEOUT,
            launch_if_not_found: true,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Tries `find` once, optionally runs `launch`, then polls `find` every
/// `poll_interval` until `timeout`.
pub fn wait_for_window<T, F, L>(
    mut find: F,
    launch: Option<L>,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<T>
where
    F: FnMut() -> Option<T>,
    L: FnOnce() -> Result<()>,
{
    if let Some(found) = find() {
        tracing::info!("Attached to existing window");
        return Ok(found);
    }

    let Some(launch) = launch else {
        return Err(BenchError::WindowNotFoundError {
            message: "No matching window and launching is disabled".to_string(),
        });
    };
    launch()?;

    let start = Instant::now();
    while start.elapsed() < timeout {
        std::thread::sleep(poll_interval.min(timeout.saturating_sub(start.elapsed())));
        if let Some(found) = find() {
            tracing::info!("Window appeared after {:.1}s", start.elapsed().as_secs_f64());
            return Ok(found);
        }
    }

    Err(BenchError::TimeoutError {
        operation: "waiting for application window".to_string(),
        seconds: timeout.as_secs(),
    })
}

/// Starts the executable detached from this process.
pub fn launch_app(exe_path: &std::path::Path, args: &[OsString]) -> Result<()> {
    if !exe_path.exists() {
        return Err(BenchError::WindowNotFoundError {
            message: format!("Executable not found: {}", exe_path.display()),
        });
    }
    tracing::info!("Launching {}", exe_path.display());
    let child = Command::new(exe_path).args(args).spawn()?;
    tracing::debug!("Launched pid {}", child.id());
    Ok(())
}

/// Finds or launches the application and returns a driver for its window.
#[cfg(windows)]
pub fn attach_app(options: &AttachOptions) -> Result<Box<dyn UiDriver>> {
    use crate::adapters::win32::{list_top_level_windows, Win32Window};

    let find = || {
        let windows = list_top_level_windows();
        select_window(&windows, &options.window_title, &options.exclude_titles)
    };
    let launch = options
        .launch_if_not_found
        .then(|| || launch_app(&options.exe_path, &options.args));

    let handle = wait_for_window(find, launch, options.timeout, options.poll_interval)?;
    let window = Win32Window::new(handle);
    ensure_foreground(&window);
    Ok(Box::new(window))
}

#[cfg(not(windows))]
pub fn attach_app(_options: &AttachOptions) -> Result<Box<dyn UiDriver>> {
    Err(BenchError::unsupported(
        "UI attach requires Windows desktop APIs",
    ))
}

/// Restore and focus; a failure is only logged.
pub fn ensure_foreground(driver: &dyn UiDriver) {
    if let Err(e) = driver.ensure_foreground() {
        tracing::warn!("Could not bring window to foreground: {}", e);
    }
}

pub fn get_window_rect(driver: &dyn UiDriver) -> Result<WindowRect> {
    driver.window_rect()
}

/// Move/resize; a failure is only logged.
pub fn set_window_rect(driver: &dyn UiDriver, left: i32, top: i32, width: i32, height: i32) {
    match driver.set_window_rect(left, top, width, height) {
        Ok(()) => tracing::info!("Window placed at {},{} {}x{}", left, top, width, height),
        Err(e) => tracing::warn!("Could not set window rect: {}", e),
    }
}
