//! Shared types for todoseq.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A task found in a note.
///
/// Produced once per parse pass and never mutated by the parser. `(path, line)`
/// identifies the task within a vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// The file path the task was read from.
    pub path: PathBuf,

    /// Line number (0-indexed).
    pub line: usize,

    /// The original line, unmodified.
    pub raw_text: String,

    /// Whitespace, quote markers and comment-open tokens before the marker.
    pub indent: String,

    /// Bullet, number, letter, checkbox or footnote marker before the keyword.
    pub list_marker: String,

    /// Cleaned body: priority token removed, whitespace collapsed.
    pub text: String,

    /// The raw keyword token (`TODO`, `DONE`, ...), empty for a bare checkbox.
    pub state: String,

    /// Whether the task is done.
    pub completed: bool,

    /// Priority from a `[#A]`/`[#B]`/`[#C]` token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Date from an associated `SCHEDULED:` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<TaskDate>,

    /// Date from an associated `DEADLINE:` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<TaskDate>,

    /// Characters after the body that must survive a rewrite (e.g. ` */`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tail: String,

    /// Urgency score, `None` exactly when the task is completed.
    pub urgency: Option<f64>,

    /// Inline tags including the leading `#`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Whether the file is a daily note.
    #[serde(default)]
    pub is_daily_note: bool,

    /// The date of the daily note the task lives in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_note_date: Option<NaiveDate>,

    /// Quote depth, or the headline level for org tasks.
    #[serde(default)]
    pub quote_nesting_level: usize,

    /// Footnote marker, either the definition (`[^1]`) or a trailing reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footnote_reference: Option<String>,

    /// Trailing block reference (`^abc123`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_reference: Option<String>,
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Med,
    Low,
}

impl Priority {
    /// Map a priority letter (`A`, `B`, `C`) to a priority.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "A" => Some(Priority::High),
            "B" => Some(Priority::Med),
            "C" => Some(Priority::Low),
            _ => None,
        }
    }

    /// The letter used in `[#X]` tokens.
    pub fn letter(self) -> char {
        match self {
            Priority::High => 'A',
            Priority::Med => 'B',
            Priority::Low => 'C',
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Med => write!(f, "med"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "a" => Ok(Priority::High),
            "med" | "medium" | "b" => Ok(Priority::Med),
            "low" | "c" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A calendar date with an optional wall-clock time.
///
/// Dates carry no timezone: they are read and compared as local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskDate {
    pub date: NaiveDate,

    /// Present only if the source token spelled out a time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

impl TaskDate {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    pub fn with_time(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time: Some(time),
        }
    }

    /// The date at its explicit time, or at midnight.
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }
}

impl std::fmt::Display for TaskDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date.format("%Y-%m-%d"), time.format("%H:%M")),
            None => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

/// What a daily-note detector reports about a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyNoteInfo {
    pub is_daily_note: bool,
    pub date: Option<NaiveDate>,
}

/// Why a line did not produce a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The line matches no task grammar.
    NoMatch,
    /// The line is inside a `$$` math block.
    InMathBlock,
    /// The line is inside a fenced code block and code blocks are excluded.
    InCodeBlock,
    /// The line is inside a `%%` comment block and comment blocks are excluded.
    InCommentBlock,
    /// The line is inside a callout and callouts are excluded.
    InCalloutBlock,
    /// The line is in a code block of a known language but is not a comment.
    MissingCommentMarker,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NoMatch => "no task syntax",
            SkipReason::InMathBlock => "inside math block",
            SkipReason::InCodeBlock => "inside code block",
            SkipReason::InCommentBlock => "inside comment block",
            SkipReason::InCalloutBlock => "inside callout",
            SkipReason::MissingCommentMarker => "code line without comment marker",
        };
        write!(f, "{}", s)
    }
}

/// The outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    /// Line number (0-indexed).
    pub line: usize,
    pub outcome: Result<Task, SkipReason>,
}

impl LineResult {
    pub fn task(&self) -> Option<&Task> {
        self.outcome.as_ref().ok()
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        self.outcome.as_ref().err().copied()
    }
}
