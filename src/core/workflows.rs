//! Hotkey parsing and the timed UI workflows.

use crate::config::BenchConfig;
use crate::core::stats::percentile_sorted;
use crate::domain::model::WorkflowResult;
use crate::domain::ports::UiDriver;
use crate::utils::error::{BenchError, Result};
use crate::utils::files::{ensure_dir, safe_write_json, unique_path};
use crate::utils::timeutil::{timestamp_filename, utc_iso8601};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    PageDown,
    PageUp,
    Enter,
    Tab,
    Escape,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
    Space,
    Delete,
    Backspace,
    Function(u8),
    Char(char),
}

impl Key {
    fn from_name(name: &str) -> Option<Key> {
        let upper = name.to_ascii_uppercase();
        let key = match upper.as_str() {
            "PGDN" | "PAGEDOWN" => Key::PageDown,
            "PGUP" | "PAGEUP" => Key::PageUp,
            "ENTER" | "RETURN" => Key::Enter,
            "TAB" => Key::Tab,
            "ESC" | "ESCAPE" => Key::Escape,
            "HOME" => Key::Home,
            "END" => Key::End,
            "UP" => Key::Up,
            "DOWN" => Key::Down,
            "LEFT" => Key::Left,
            "RIGHT" => Key::Right,
            "SPACE" => Key::Space,
            "DEL" | "DELETE" => Key::Delete,
            "BACKSPACE" | "BS" => Key::Backspace,
            _ => {
                let n: u8 = upper.strip_prefix('F')?.parse().ok()?;
                if (1..=12).contains(&n) {
                    Key::Function(n)
                } else {
                    return None;
                }
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::PageDown => "PGDN",
            Key::PageUp => "PGUP",
            Key::Enter => "ENTER",
            Key::Tab => "TAB",
            Key::Escape => "ESC",
            Key::Home => "HOME",
            Key::End => "END",
            Key::Up => "UP",
            Key::Down => "DOWN",
            Key::Left => "LEFT",
            Key::Right => "RIGHT",
            Key::Space => "SPACE",
            Key::Delete => "DEL",
            Key::Backspace => "BACKSPACE",
            Key::Function(n) => return write!(f, "F{}", n),
            Key::Char(c) => return write!(f, "{}", c),
        };
        f.write_str(name)
    }
}

/// One key plus held modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub key: Key,
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("^")?;
        }
        if self.alt {
            f.write_str("%")?;
        }
        if self.shift {
            f.write_str("+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parses `[%^+]*KEY` where KEY is a name (`PGDN`, `F5`, optionally in braces)
/// or a single printable character.
pub fn parse_hotkey(keys: &str) -> std::result::Result<Hotkey, String> {
    let keys = keys.trim();
    if keys.is_empty() {
        return Err("hotkey is empty".to_string());
    }

    let mut hotkey = Hotkey {
        alt: false,
        ctrl: false,
        shift: false,
        key: Key::Enter,
    };

    let mut rest = keys;
    // A lone modifier character is a literal key.
    while rest.chars().count() > 1 {
        match rest.chars().next() {
            Some('%') => hotkey.alt = true,
            Some('^') => hotkey.ctrl = true,
            Some('+') => hotkey.shift = true,
            _ => break,
        }
        rest = &rest[1..];
    }

    let name = rest
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .unwrap_or(rest);

    let mut chars = name.chars();
    hotkey.key = match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() && !c.is_whitespace() => Key::Char(c),
        (Some(_), Some(_)) => {
            Key::from_name(name).ok_or_else(|| format!("unknown key name '{}'", name))?
        }
        _ => return Err(format!("no key after modifiers in '{}'", keys)),
    };

    Ok(hotkey)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum WorkflowKind {
    Scrub,
    Attribute,
    Horizon,
    Export,
}

impl WorkflowKind {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::Scrub => "scrub",
            WorkflowKind::Attribute => "attribute",
            WorkflowKind::Horizon => "horizon",
            WorkflowKind::Export => "export",
        }
    }
}

struct StepTimer {
    name: String,
    started_at: String,
    start: Instant,
    steps: Vec<f64>,
}

impl StepTimer {
    fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            started_at: utc_iso8601(None),
            start: Instant::now(),
            steps: Vec::new(),
        }
    }

    fn step(&mut self, driver: &dyn UiDriver, hotkey: &Hotkey) -> Result<()> {
        let t = Instant::now();
        driver.send_hotkey(hotkey)?;
        self.steps.push(t.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }

    fn finish(mut self) -> WorkflowResult {
        self.steps.sort_by(|a, b| a.total_cmp(b));
        let step_avg_ms = if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<f64>() / self.steps.len() as f64
        };
        let result = WorkflowResult {
            name: self.name,
            started_at: self.started_at,
            steps: self.steps.len(),
            total_sec: self.start.elapsed().as_secs_f64(),
            step_avg_ms,
            step_p95_ms: percentile_sorted(&self.steps, 0.95).unwrap_or(0.0),
        };
        tracing::info!(
            "Workflow {}: {} step(s) in {:.2}s (avg {:.1}ms, p95 {:.1}ms)",
            result.name,
            result.steps,
            result.total_sec,
            result.step_avg_ms,
            result.step_p95_ms
        );
        result
    }
}

/// Sends `hotkey` `count` times, pausing `delay` between presses.
pub fn run_scrub(
    driver: &dyn UiDriver,
    hotkey: &Hotkey,
    count: u32,
    delay: Duration,
) -> Result<WorkflowResult> {
    let mut timer = StepTimer::start(WorkflowKind::Scrub.name());
    for i in 0..count {
        timer.step(driver, hotkey)?;
        if i + 1 < count {
            driver.pause(delay);
        }
    }
    Ok(timer.finish())
}

/// A single timed key press.
pub fn run_hotkey_action(driver: &dyn UiDriver, name: &str, hotkey: &Hotkey) -> Result<WorkflowResult> {
    let mut timer = StepTimer::start(name);
    timer.step(driver, hotkey)?;
    Ok(timer.finish())
}

/// Triggers autotracking, then lets it run for `hold`.
pub fn run_horizon(driver: &dyn UiDriver, hotkey: &Hotkey, hold: Duration) -> Result<WorkflowResult> {
    let mut timer = StepTimer::start(WorkflowKind::Horizon.name());
    timer.step(driver, hotkey)?;
    driver.pause(hold);
    Ok(timer.finish())
}

fn configured_hotkey(keys: &str, field: &str) -> Result<Hotkey> {
    parse_hotkey(keys).map_err(|reason| BenchError::InvalidConfigValueError {
        field: field.to_string(),
        value: keys.to_string(),
        reason,
    })
}

/// Runs one workflow with the hotkeys and timings from `config`.
pub fn run_workflow(
    kind: WorkflowKind,
    driver: &dyn UiDriver,
    config: &BenchConfig,
) -> Result<WorkflowResult> {
    let hotkeys = &config.hotkeys;
    let defaults = &config.defaults;
    tracing::info!("Running workflow: {}", kind.name());

    match kind {
        WorkflowKind::Scrub => {
            let key = configured_hotkey(&hotkeys.scrub_next_inline, "hotkeys.scrub_next_inline")?;
            let delay = Duration::try_from_secs_f64(defaults.scrub_delay_sec).map_err(|e| {
                BenchError::InvalidConfigValueError {
                    field: "defaults.scrub_delay_sec".to_string(),
                    value: defaults.scrub_delay_sec.to_string(),
                    reason: e.to_string(),
                }
            })?;
            run_scrub(driver, &key, defaults.scrub_count, delay)
        }
        WorkflowKind::Attribute => {
            let key = configured_hotkey(&hotkeys.attribute_compute, "hotkeys.attribute_compute")?;
            run_hotkey_action(driver, kind.name(), &key)
        }
        WorkflowKind::Export => {
            let key = configured_hotkey(&hotkeys.export_slice, "hotkeys.export_slice")?;
            run_hotkey_action(driver, kind.name(), &key)
        }
        WorkflowKind::Horizon => {
            let key = configured_hotkey(&hotkeys.horizon_autotrack, "hotkeys.horizon_autotrack")?;
            run_horizon(
                driver,
                &key,
                Duration::from_secs(defaults.horizon_run_seconds),
            )
        }
    }
}

/// Writes `<ui_dir>/<name>_<timestamp>.json` without replacing an earlier run.
pub fn save_workflow_result(result: &WorkflowResult, ui_dir: &Path) -> Result<PathBuf> {
    ensure_dir(ui_dir)?;
    let path = unique_path(&ui_dir.join(timestamp_filename(&result.name, "", "json")));
    safe_write_json(&path, result)?;
    tracing::info!("Workflow result written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ui_attach::WindowRect;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingDriver {
        keys: RefCell<Vec<String>>,
        pauses: RefCell<Vec<Duration>>,
    }

    impl UiDriver for RecordingDriver {
        fn ensure_foreground(&self) -> Result<()> {
            Ok(())
        }

        fn window_rect(&self) -> Result<WindowRect> {
            Ok(WindowRect::new(0, 0, 800, 600))
        }

        fn set_window_rect(&self, _: i32, _: i32, _: i32, _: i32) -> Result<()> {
            Ok(())
        }

        fn send_hotkey(&self, hotkey: &Hotkey) -> Result<()> {
            self.keys.borrow_mut().push(hotkey.to_string());
            Ok(())
        }

        fn pause(&self, duration: Duration) {
            self.pauses.borrow_mut().push(duration);
        }
    }

    #[test]
    fn test_parse_modifiers_and_names() {
        let alt1 = parse_hotkey("%1").unwrap();
        assert!(alt1.alt && !alt1.ctrl && !alt1.shift);
        assert_eq!(alt1.key, Key::Char('1'));

        let ctrl_shift = parse_hotkey("^+{F5}").unwrap();
        assert!(ctrl_shift.ctrl && ctrl_shift.shift);
        assert_eq!(ctrl_shift.key, Key::Function(5));

        assert_eq!(parse_hotkey("PGDN").unwrap().key, Key::PageDown);
        assert_eq!(parse_hotkey("{ENTER}").unwrap().key, Key::Enter);
        assert_eq!(parse_hotkey("+").unwrap().key, Key::Char('+'));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_hotkey("").is_err());
        assert!(parse_hotkey("%").is_ok());
        assert!(parse_hotkey("%{}").is_err());
        assert!(parse_hotkey("F13").is_err());
        assert!(parse_hotkey("^NOTAKEY").unwrap_err().contains("NOTAKEY"));
    }

    #[test]
    fn test_display_round_trips() {
        for keys in ["%1", "^+F5", "PGDN", "^%x"] {
            let parsed = parse_hotkey(keys).unwrap();
            assert_eq!(parse_hotkey(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_scrub_sends_count_keys() {
        let driver = RecordingDriver::default();
        let key = parse_hotkey("PGDN").unwrap();
        let result = run_scrub(&driver, &key, 5, Duration::from_millis(40)).unwrap();

        assert_eq!(result.name, "scrub");
        assert_eq!(result.steps, 5);
        assert_eq!(driver.keys.borrow().len(), 5);
        assert!(driver.keys.borrow().iter().all(|k| k == "PGDN"));
        assert_eq!(driver.pauses.borrow().len(), 4);
    }

    fn config_with_delay(delay: &str) -> BenchConfig {
        let yaml = format!(
            r#"
app:
  exe_path: /opt/app/Petrel.exe
paths:
  project_shared_zgy_local: /data/a.pet
  project_fast_vzgy_local: /data/b.pet
data_sources:
  shared_zgy_hint: a.zgy
  fast_vzgy_hint: b.zgy
  azure_blob:
    account: test
    container: test
cache:
  cache_dir: /tmp/cache
out_dir: /tmp/out
defaults:
  scrub_count: 3
  scrub_delay_sec: {}
benchmark:
  nas_test_dir: /mnt/nas
  nas_ping_host: nas.example.com
"#,
            delay
        );
        BenchConfig::from_yaml_str(&yaml).unwrap()
    }

    #[test]
    fn test_scrub_workflow_uses_configured_delay() {
        let driver = RecordingDriver::default();
        let config = config_with_delay("0.25");
        let result = run_workflow(WorkflowKind::Scrub, &driver, &config).unwrap();

        assert_eq!(result.steps, 3);
        assert_eq!(driver.pauses.borrow().as_slice(), [Duration::from_millis(250); 2]);
    }

    #[test]
    fn test_scrub_workflow_rejects_unusable_delay() {
        for delay in [".inf", ".nan", "-1.0"] {
            let driver = RecordingDriver::default();
            let config = config_with_delay(delay);
            let err = run_workflow(WorkflowKind::Scrub, &driver, &config).unwrap_err();
            assert!(err.to_string().contains("defaults.scrub_delay_sec"), "{}", delay);
            assert!(driver.keys.borrow().is_empty());
        }
    }

    #[test]
    fn test_horizon_holds_after_trigger() {
        let driver = RecordingDriver::default();
        let key = parse_hotkey("%2").unwrap();
        let result = run_horizon(&driver, &key, Duration::from_secs(45)).unwrap();

        assert_eq!(result.steps, 1);
        assert_eq!(driver.keys.borrow().as_slice(), ["%2".to_string()]);
        assert_eq!(driver.pauses.borrow().as_slice(), [Duration::from_secs(45)]);
    }

    #[test]
    fn test_save_workflow_result_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let driver = RecordingDriver::default();
        let key = parse_hotkey("%3").unwrap();
        let result = run_hotkey_action(&driver, "export", &key).unwrap();

        let path = save_workflow_result(&result, &dir.path().join("ui")).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("export_"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["name"], "export");
        assert_eq!(json["steps"], 1);

        let again = save_workflow_result(&result, &dir.path().join("ui")).unwrap();
        assert_ne!(again, path);
    }
}
