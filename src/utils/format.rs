//! Formatting utilities for file sizes, dates, and other display values.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{RECYCLE_ALERT_DAYS, RECYCLE_WARN_DAYS};

/// Format a byte count with binary units (e.g., "0 B", "1.50 KB", "3.00 MB").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a server datetime ("2025-10-19 09:51:04" or ISO 8601) as
/// "YYYY-MM-DD HH:MM". Returns "-" for anything unrecognizable.
pub fn format_datetime(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return "-".to_string();
    };

    let normalized = value.replacen('T', " ", 1);
    let bytes = normalized.as_bytes();
    let well_formed = bytes.len() >= 16
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && bytes[..16]
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7 | 10 | 13) || b.is_ascii_digit());

    if well_formed {
        normalized[..16].to_string()
    } else {
        "-".to_string()
    }
}

/// Date part of a server datetime ("2025-10-19").
pub fn format_date(value: Option<&str>) -> String {
    let full = format_datetime(value);
    full.get(..10).map(str::to_string).unwrap_or(full)
}

static MD_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static MD_LINK_TARGET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]\([^)]*\)").unwrap());
static MD_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*`~\[\]()>_|-]").unwrap());
static LATIN_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// Word count for the editor footer: CJK characters count individually,
/// Latin words (and numbers) count once each. Markdown syntax is ignored.
pub fn count_words(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }

    let text = MD_IMAGE.replace_all(text, " ");
    let text = MD_LINK_TARGET.replace_all(&text, " ");
    let text = MD_SYMBOLS.replace_all(&text, " ");

    let cjk = text.chars().filter(|c| is_cjk(*c)).count();
    cjk + LATIN_WORD.find_iter(&text).count()
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{4e00}'..='\u{9fff}'
            | '\u{3400}'..='\u{4dbf}'
            | '\u{3040}'..='\u{30ff}'
            | '\u{ac00}'..='\u{d7af}'
    )
}

/// Lowercased extension of a file name, without the dot.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Document title derived from an uploaded file name ("notes.md" → "notes").
pub fn title_from_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// Severity of a recycle bin badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeTone {
    Safe,
    Warn,
    Alert,
}

impl BadgeTone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warn => "warn",
            Self::Alert => "alert",
        }
    }
}

/// Badge for a recycled file given the days left before it is purged.
pub fn recycle_badge(days: Option<i64>) -> (String, BadgeTone) {
    match days {
        None => ("Retained".to_string(), BadgeTone::Safe),
        Some(d) if d <= 0 => ("Purging soon".to_string(), BadgeTone::Alert),
        Some(d) => {
            let label = if d == 1 {
                "1 day left".to_string()
            } else {
                format!("{d} days left")
            };
            let tone = if d <= RECYCLE_ALERT_DAYS {
                BadgeTone::Alert
            } else if d <= RECYCLE_WARN_DAYS {
                BadgeTone::Warn
            } else {
                BadgeTone::Safe
            };
            (label, tone)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(Some("2025-10-19 09:51:04")), "2025-10-19 09:51");
        assert_eq!(format_datetime(Some("2025-10-19T09:51:04.123Z")), "2025-10-19 09:51");
        assert_eq!(format_datetime(Some("yesterday")), "-");
        assert_eq!(format_datetime(None), "-");
        assert_eq!(format_date(Some("2025-10-19 09:51:04")), "2025-10-19");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("# Hello **world**"), 2);
        assert_eq!(count_words("你好 world"), 3);
        assert_eq!(count_words("see [docs](https://example.com/a/b) now"), 3);
        assert_eq!(count_words("![diagram](img.png)"), 0);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_extension("Report.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".gitignore").as_deref(), Some("gitignore"));
        assert_eq!(title_from_file_name("notes.md"), "notes");
        assert_eq!(title_from_file_name("dir/a.b.txt"), "a.b");
        assert_eq!(title_from_file_name(".env"), ".env");
    }

    #[test]
    fn test_recycle_badge() {
        assert_eq!(recycle_badge(Some(0)), ("Purging soon".into(), BadgeTone::Alert));
        assert_eq!(recycle_badge(Some(-2)).1, BadgeTone::Alert);
        assert_eq!(recycle_badge(Some(3)), ("3 days left".into(), BadgeTone::Alert));
        assert_eq!(recycle_badge(Some(5)).1, BadgeTone::Warn);
        assert_eq!(recycle_badge(Some(7)).1, BadgeTone::Warn);
        assert_eq!(recycle_badge(Some(8)).1, BadgeTone::Safe);
        assert_eq!(recycle_badge(None).1, BadgeTone::Safe);
    }
}
