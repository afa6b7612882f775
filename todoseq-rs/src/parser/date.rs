//! Bracketed date tokens: `<2026-02-12>`, `<2026-02-12 Thu>`, `<2026-02-12 Thu 14:30>`.

use crate::error::{Result, TodoseqError};
use crate::types::TaskDate;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

// Repeater and warning cookies (+1w, .+2d, --3d) and an optional end time.
const TRAILER: &str = r"(?:-\d{1,2}:\d{2})?(?:[ \t]+(?:\.?\+\+?|--?)\d+[hdwmy])*[ \t]*";

/// Tried in order: date+dow+time, date+dow, date+time, date.
static DATE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    let ymd = r"(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})";
    let dow = r"[ \t]+\p{L}{2,}\.?";
    let time = r"[ \t]+(?P<h>\d{1,2}):(?P<min>\d{2})";
    [
        Regex::new(&format!(r"^<{ymd}{dow}{time}{TRAILER}>$")).unwrap(),
        Regex::new(&format!(r"^<{ymd}{dow}{TRAILER}>$")).unwrap(),
        Regex::new(&format!(r"^<{ymd}{time}{TRAILER}>$")).unwrap(),
        Regex::new(&format!(r"^<{ymd}{TRAILER}>$")).unwrap(),
    ]
});

/// Rewrite an inactive `[...]` timestamp to the active `<...>` form.
pub fn normalize_brackets(token: &str) -> String {
    let token = token.trim();
    match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => format!("<{}>", inner),
        None => token.to_string(),
    }
}

/// Parse a date token into a local date, keeping the time only if one is given.
pub fn parse_date(token: &str) -> Result<TaskDate> {
    let token = normalize_brackets(token);

    for pattern in DATE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(&token) else {
            continue;
        };

        let field = |name: &str| -> Option<u32> { caps.name(name)?.as_str().parse().ok() };
        let year: i32 = caps["y"]
            .parse()
            .map_err(|_| TodoseqError::InvalidDate(token.clone()))?;
        let date = field("m")
            .zip(field("d"))
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .ok_or_else(|| TodoseqError::InvalidDate(token.clone()))?;

        return match (field("h"), field("min")) {
            (Some(h), Some(min)) => NaiveTime::from_hms_opt(h, min, 0)
                .map(|time| TaskDate::with_time(date, time))
                .ok_or_else(|| TodoseqError::InvalidDate(token.clone())),
            _ => Ok(TaskDate::new(date)),
        };
    }

    Err(TodoseqError::InvalidDate(token))
}
