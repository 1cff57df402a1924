//! Win32 window enumeration, placement and synthesized key presses.

use crate::core::ui_attach::WindowRect;
use crate::core::workflows::{Hotkey, Key};
use crate::domain::ports::UiDriver;
use crate::utils::error::{BenchError, Result};
use windows_sys::Win32::Foundation::{HWND, LPARAM, RECT};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    keybd_event, VkKeyScanW, KEYEVENTF_KEYUP, VK_BACK, VK_CONTROL, VK_DELETE, VK_DOWN, VK_END,
    VK_ESCAPE, VK_F1, VK_HOME, VK_LEFT, VK_MENU, VK_NEXT, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SHIFT,
    VK_SPACE, VK_TAB, VK_UP,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsIconic, IsWindowVisible,
    MoveWindow, SetForegroundWindow, ShowWindow, SW_RESTORE,
};

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> i32 {
    // SAFETY: lparam is the Vec passed by list_top_level_windows for the
    // duration of the EnumWindows call.
    let windows = unsafe { &mut *(lparam as *mut Vec<(HWND, String)>) };

    if unsafe { IsWindowVisible(hwnd) } == 0 {
        return 1;
    }
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return 1;
    }

    let mut buf = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32) };
    if copied > 0 {
        windows.push((hwnd, String::from_utf16_lossy(&buf[..copied as usize])));
    }
    1
}

/// Visible top-level windows with a non-empty title.
pub fn list_top_level_windows() -> Vec<(HWND, String)> {
    let mut windows: Vec<(HWND, String)> = Vec::new();
    // SAFETY: the callback only touches `windows`, which outlives the call.
    unsafe {
        EnumWindows(Some(collect_window), &mut windows as *mut _ as LPARAM);
    }
    windows
}

fn virtual_key(key: Key) -> Option<u8> {
    let vk = match key {
        Key::PageDown => VK_NEXT,
        Key::PageUp => VK_PRIOR,
        Key::Enter => VK_RETURN,
        Key::Tab => VK_TAB,
        Key::Escape => VK_ESCAPE,
        Key::Home => VK_HOME,
        Key::End => VK_END,
        Key::Up => VK_UP,
        Key::Down => VK_DOWN,
        Key::Left => VK_LEFT,
        Key::Right => VK_RIGHT,
        Key::Space => VK_SPACE,
        Key::Delete => VK_DELETE,
        Key::Backspace => VK_BACK,
        Key::Function(n) => VK_F1 + (n as u16 - 1),
        Key::Char(c) => {
            let mut utf16 = [0u16; 2];
            if c.encode_utf16(&mut utf16).len() != 1 {
                return None;
            }
            // Low byte is the virtual key, -1 when unmapped.
            let scan = unsafe { VkKeyScanW(utf16[0]) };
            if scan == -1 {
                return None;
            }
            (scan as u16) & 0xFF
        }
    };
    Some(vk as u8)
}

fn press(vk: u8) {
    unsafe { keybd_event(vk, 0, 0, 0) };
}

fn release(vk: u8) {
    unsafe { keybd_event(vk, 0, KEYEVENTF_KEYUP, 0) };
}

/// A top-level window found by title.
#[derive(Debug, Clone, Copy)]
pub struct Win32Window {
    hwnd: HWND,
}

impl Win32Window {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }
}

impl UiDriver for Win32Window {
    fn ensure_foreground(&self) -> Result<()> {
        unsafe {
            if IsIconic(self.hwnd) != 0 {
                ShowWindow(self.hwnd, SW_RESTORE);
            }
            if SetForegroundWindow(self.hwnd) == 0 {
                return Err(BenchError::WindowNotFoundError {
                    message: "SetForegroundWindow was refused".to_string(),
                });
            }
        }
        Ok(())
    }

    fn window_rect(&self) -> Result<WindowRect> {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetWindowRect(self.hwnd, &mut rect) } == 0 {
            return Err(BenchError::WindowNotFoundError {
                message: "GetWindowRect failed".to_string(),
            });
        }
        Ok(WindowRect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn set_window_rect(&self, left: i32, top: i32, width: i32, height: i32) -> Result<()> {
        if unsafe { MoveWindow(self.hwnd, left, top, width, height, 1) } == 0 {
            return Err(BenchError::WindowNotFoundError {
                message: "MoveWindow failed".to_string(),
            });
        }
        Ok(())
    }

    fn send_hotkey(&self, hotkey: &Hotkey) -> Result<()> {
        let vk = virtual_key(hotkey.key).ok_or_else(|| {
            BenchError::unsupported(format!("No virtual key for '{}'", hotkey.key))
        })?;

        let modifiers: Vec<u8> = [
            (hotkey.ctrl, VK_CONTROL),
            (hotkey.alt, VK_MENU),
            (hotkey.shift, VK_SHIFT),
        ]
        .into_iter()
        .filter(|(held, _)| *held)
        .map(|(_, vk)| vk as u8)
        .collect();

        for m in &modifiers {
            press(*m);
        }
        press(vk);
        release(vk);
        for m in modifiers.iter().rev() {
            release(*m);
        }
        Ok(())
    }
}
