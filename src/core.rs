use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::{
    fs,
    io::Write as _,
    os::unix::fs::PermissionsExt as _,
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::consts::LOG_TARGET_PREFIX;

/// Monotonic counter for generating unique temp file suffixes.
static FILE_SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Install an `env_logger` backend for embedders that have none. Honors
/// `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "[{LOG_TARGET_PREFIX}][{ts}] {:<5} {}",
                record.level(),
                record.args()
            )
        })
        .try_init();
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn truncate_message(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let truncated: String = input.chars().take(max_chars).collect();
    format!("{truncated}...")
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) or a bare
/// date (UTC midnight).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Absolute local time for a message card. Unparseable input is returned as is.
pub fn format_message_time(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y/%-m/%-d %H:%M:%S")
            .to_string(),
        None => timestamp.to_string(),
    }
}

/// Relative age of a config's `last_used` stamp as seen at `now`.
pub fn format_last_used(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(parsed) = parse_timestamp(timestamp) else {
        return timestamp.to_string();
    };

    let elapsed_ms = now.signed_duration_since(parsed).num_milliseconds();
    if elapsed_ms < 60_000 {
        return "just now".to_string();
    }
    if elapsed_ms < 3_600_000 {
        return plural(elapsed_ms / 60_000, "minute");
    }
    if elapsed_ms < 86_400_000 {
        return plural(elapsed_ms / 3_600_000, "hour");
    }
    parsed.with_timezone(&Local).format("%Y/%-m/%-d").to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

pub(crate) fn unique_file_suffix() -> u64 {
    FILE_SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn restrict_file_permissions(path: &Path) {
    if path.exists() {
        if let Err(error) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            log::debug!("restrict_file_permissions: failed for {path:?}: {error}");
        }
    }
}

/// Write `content` next to `path` and rename it into place.
pub(crate) fn write_atomically(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("Failed to create directory {parent:?}: {error}"))?;
        }
    }
    let tmp_path = path.with_extension(format!("tmp-{}", unique_file_suffix()));
    fs::write(&tmp_path, content)
        .map_err(|error| format!("Failed to write temp file {tmp_path:?}: {error}"))?;
    restrict_file_permissions(&tmp_path);
    fs::rename(&tmp_path, path)
        .map_err(|error| format!("Failed to atomically replace {path:?}: {error}"))
}
