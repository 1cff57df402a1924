use chrono::{DateTime, SecondsFormat, Utc};

/// ISO8601 UTC with millisecond precision and a `Z` suffix.
pub fn utc_iso8601(dt: Option<DateTime<Utc>>) -> String {
    dt.unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `prefix_YYYYMMDD_HHMMSS_suffix.ext`, skipping empty parts.
pub fn timestamp_filename(prefix: &str, suffix: &str, extension: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let mut name = [prefix, timestamp.as_str(), suffix]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_");

    if !extension.is_empty() {
        if !extension.starts_with('.') {
            name.push('.');
        }
        name.push_str(extension);
    }
    name
}
