use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFoundError { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Process {pid} does not exist")]
    ProcessNotFoundError { pid: u32 },

    #[error("Probe failed: {message}")]
    ProbeError { message: String },

    #[error("Window not found: {message}")]
    WindowNotFoundError { message: String },

    #[error("Timed out after {seconds}s: {operation}")]
    TimeoutError { operation: String, seconds: u64 },

    #[error("Unsupported on this platform: {message}")]
    UnsupportedError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Process,
    Ui,
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl BenchError {
    pub fn probe(message: impl Into<String>) -> Self {
        BenchError::ProbeError {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        BenchError::UnsupportedError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BenchError::HttpError(_) | BenchError::ProbeError { .. } => ErrorCategory::Network,
            BenchError::CsvError(_)
            | BenchError::IoError(_)
            | BenchError::SerializationError(_) => ErrorCategory::Storage,
            BenchError::ConfigNotFoundError { .. }
            | BenchError::ConfigParseError { .. }
            | BenchError::InvalidConfigValueError { .. }
            | BenchError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            BenchError::ProcessNotFoundError { .. } => ErrorCategory::Process,
            BenchError::WindowNotFoundError { .. } | BenchError::TimeoutError { .. } => {
                ErrorCategory::Ui
            }
            BenchError::UnsupportedError { .. } => ErrorCategory::Platform,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Process | ErrorCategory::Ui => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage | ErrorCategory::Platform => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a binary that stops on this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BenchError::ConfigNotFoundError { .. } => {
                "Pass the path to an existing YAML configuration file"
            }
            BenchError::ConfigParseError { .. } => {
                "Check the configuration file against config/config.example.yaml"
            }
            BenchError::InvalidConfigValueError { .. } | BenchError::ConfigValidationError { .. } => {
                "Fix the named configuration field and run again"
            }
            BenchError::ProcessNotFoundError { .. } => {
                "Start the target application first and pass its PID"
            }
            BenchError::HttpError(_) | BenchError::ProbeError { .. } => {
                "Check network connectivity and that SAS URLs have not expired"
            }
            BenchError::WindowNotFoundError { .. } | BenchError::TimeoutError { .. } => {
                "Make sure the application is running and its main window is visible"
            }
            BenchError::UnsupportedError { .. } => "Run this command on a Windows workstation",
            BenchError::CsvError(_) | BenchError::IoError(_) | BenchError::SerializationError(_) => {
                "Check that the output directory exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Network probe failed: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
            ErrorCategory::Process => format!("Target process problem: {}", self),
            ErrorCategory::Ui => format!("UI automation failed: {}", self),
            ErrorCategory::Platform => self.to_string(),
        }
    }
}

impl From<serde_yaml_ng::Error> for BenchError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        BenchError::ConfigParseError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_non_zero() {
        let err = BenchError::InvalidConfigValueError {
            field: "benchmark.nas_ping_host".to_string(),
            value: String::new(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("benchmark.nas_ping_host"));
    }

    #[test]
    fn test_process_not_found_is_high_severity() {
        let err = BenchError::ProcessNotFoundError { pid: 42 };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("42"));
    }

    #[test]
    fn test_every_category_exits_non_zero() {
        let errors = [
            BenchError::probe("no bytes"),
            BenchError::ConfigParseError {
                message: "bad yaml".to_string(),
            },
            BenchError::ProcessNotFoundError { pid: 1 },
            BenchError::IoError(std::io::Error::other("disk")),
            BenchError::unsupported("not windows"),
        ];
        let codes: Vec<i32> = errors.iter().map(BenchError::exit_code).collect();
        assert_eq!(codes, vec![2, 1, 1, 3, 3]);
    }
}
