//! Association of `SCHEDULED:` / `DEADLINE:` lines with the task above them.

use crate::parser::context::LineContext;
use crate::parser::date::parse_date;
use crate::types::TaskDate;
use regex::Regex;
use std::sync::LazyLock;

// Quote markers and comment tokens that may precede a planning keyword
static METADATA_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:>[ \t]*)*(?:(?://+|/\*+|\*+|#+|--|;+|%%|<!--)[ \t]*)?").unwrap()
});

// One planning entry; a line may hold several
static PLANNING_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(SCHEDULED|DEADLINE|CLOSED):[ \t]*([<\[][^>\]]*[>\]])").unwrap()
});

// Drawer opener such as :PROPERTIES: or :LOGBOOK:
static DRAWER_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:[A-Za-z][\w-]*:$").unwrap()
});

/// How far the lookahead may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStyle {
    /// Continue only over blank lines, drawers and planning lines.
    Markdown,
    /// Continue until the next headline.
    Org,
}

/// Dates found for one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanningDates {
    pub scheduled: Option<TaskDate>,
    pub deadline: Option<TaskDate>,
}

impl PlanningDates {
    fn is_complete(&self) -> bool {
        self.scheduled.is_some() && self.deadline.is_some()
    }
}

/// Scan the lines after `task_line` for planning metadata.
///
/// When `contexts` is given, the scan stops at the first line outside the
/// task's code/comment/math region.
pub fn associate_dates(
    lines: &[&str],
    task_line: usize,
    contexts: Option<&[LineContext]>,
    style: PlanningStyle,
) -> PlanningDates {
    let mut dates = PlanningDates::default();
    let mut in_drawer = false;
    let task_ctx = contexts.and_then(|c| c.get(task_line));

    for idx in (task_line + 1)..lines.len() {
        let line = lines[idx];

        if let (Some(task_ctx), Some(ctx)) = (task_ctx, contexts.and_then(|c| c.get(idx))) {
            if !task_ctx.same_region(ctx) {
                break;
            }
        }

        if style == PlanningStyle::Org && line.starts_with('*') {
            break;
        }

        let content = strip_metadata_prefix(line).trim();

        if in_drawer {
            if content.eq_ignore_ascii_case(":END:") {
                in_drawer = false;
            }
            continue;
        }
        if content.is_empty() {
            continue;
        }
        if DRAWER_OPEN.is_match(content) && !content.eq_ignore_ascii_case(":END:") {
            in_drawer = true;
            continue;
        }

        if is_planning_line(content) {
            read_planning_line(content, &mut dates);
            if dates.is_complete() {
                break;
            }
            continue;
        }

        if style == PlanningStyle::Markdown {
            break;
        }
    }

    dates
}

fn strip_metadata_prefix(line: &str) -> &str {
    match METADATA_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

fn is_planning_line(content: &str) -> bool {
    content.starts_with("SCHEDULED:")
        || content.starts_with("DEADLINE:")
        || content.starts_with("CLOSED:")
}

/// Record the first SCHEDULED and first DEADLINE; later duplicates are ignored.
fn read_planning_line(content: &str, dates: &mut PlanningDates) {
    for caps in PLANNING_ENTRY.captures_iter(content) {
        let slot = match &caps[1] {
            "SCHEDULED" => &mut dates.scheduled,
            "DEADLINE" => &mut dates.deadline,
            _ => continue,
        };
        if slot.is_some() {
            continue;
        }
        match parse_date(&caps[2]) {
            Ok(date) => *slot = Some(date),
            Err(e) => tracing::debug!("ignoring planning date: {}", e),
        }
    }
}
