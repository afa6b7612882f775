//! Org-mode headline tasks.
//!
//! ```text
//! ** TODO [#B] Call Bob :work:phone:
//!    SCHEDULED: <2026-02-12 Thu> DEADLINE: <2026-02-14 Sat>
//! ```

use crate::config::{Config, ParserSettings};
use crate::daily_note::{DailyNoteDetector, FilenameDailyNotes};
use crate::keywords::KeywordManager;
use crate::parser::line::{collapse_whitespace, extract_tags, ParsedLine};
use crate::parser::planning::{associate_dates, PlanningStyle};
use crate::parser::task::{has_any_keyword, ParserCore};
use crate::types::{LineResult, Priority, SkipReason, Task};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

// Org priority cookie; brackets are optional
static ORG_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?#([ABC])\b\]?").unwrap()
});

// #+BEGIN_SRC, #+begin_quote, ...
static BLOCK_BEGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*#\+begin_(\w+)").unwrap()
});

static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*#\+end_(\w+)").unwrap()
});

/// Extracts tasks from org headlines.
pub struct OrgModeTaskParser {
    core: ParserCore,
}

impl Default for OrgModeTaskParser {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

impl OrgModeTaskParser {
    pub fn new(settings: ParserSettings) -> Self {
        Self {
            core: ParserCore::new(settings),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let parser = Self::new(config.parser.clone());
        match FilenameDailyNotes::from_config(&config.daily_notes) {
            Some(detector) => parser.with_daily_notes(detector),
            None => parser,
        }
    }

    pub fn with_daily_notes(mut self, detector: impl DailyNoteDetector + 'static) -> Self {
        self.core.set_daily_notes(Arc::new(detector));
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.core.set_today(today);
        self
    }

    pub fn update_config(&mut self, settings: ParserSettings) {
        self.core.update(settings);
    }

    pub fn settings(&self) -> &ParserSettings {
        self.core.settings()
    }

    pub fn keywords(&self) -> &KeywordManager {
        self.core.keywords()
    }

    pub fn parse_file(&self, content: &str, path: &Path) -> Vec<Task> {
        self.parse_file_detailed(content, path)
            .into_iter()
            .filter_map(|result| result.outcome.ok())
            .collect()
    }

    pub fn parse_file_detailed(&self, content: &str, path: &Path) -> Vec<LineResult> {
        let lines: Vec<&str> = content.lines().collect();
        let daily = self.core.daily_note_info(path);
        let mut block: Option<String> = None;
        let mut results = Vec::with_capacity(lines.len());

        for (idx, line) in lines.iter().enumerate() {
            let outcome = if let Some(kind) = block.as_deref() {
                let reason = block_skip_reason(kind);
                let closes = BLOCK_END
                    .captures(line)
                    .is_some_and(|caps| caps[1].eq_ignore_ascii_case(kind));
                if closes {
                    block = None;
                }
                Err(reason)
            } else if let Some(caps) = BLOCK_BEGIN.captures(line) {
                let kind = caps[1].to_lowercase();
                let reason = block_skip_reason(&kind);
                block = Some(kind);
                Err(reason)
            } else {
                self.parse_headline(line).map(|parsed| {
                    let dates = associate_dates(&lines, idx, None, PlanningStyle::Org);
                    self.core.finish(parsed, path, idx, line, dates, daily)
                })
            };
            results.push(LineResult { line: idx, outcome });
        }

        results
    }

    /// Parse a single headline; planning lines are not consulted.
    pub fn parse_line(&self, line: &str, line_number: usize, path: &Path) -> Option<Task> {
        let parsed = self.parse_headline(line).ok()?;
        let daily = self.core.daily_note_info(path);
        Some(self.core.finish(parsed, path, line_number, line, Default::default(), daily))
    }

    pub fn is_task_line(&self, line: &str) -> bool {
        self.core.grammar().org.is_match(line)
    }

    pub fn has_any_keyword(&self, content: &str) -> bool {
        has_any_keyword(&self.core, content)
    }

    fn parse_headline(&self, line: &str) -> Result<ParsedLine, SkipReason> {
        let caps = self.core.grammar().org.captures(line).ok_or(SkipReason::NoMatch)?;
        let stars = caps.name("stars").map(|m| m.as_str()).unwrap_or("");
        let state = caps.name("state").map(|m| m.as_str()).unwrap_or("").to_string();
        let body = caps.name("body").map(|m| m.as_str()).unwrap_or("");

        // Marker is the stars plus the whitespace before the keyword.
        let state_start = caps.name("state").map(|m| m.start()).unwrap_or(stars.len());
        let list_marker = line[..state_start].to_string();

        let (title, heading_tags) = split_heading_tags(body);
        let (text, priority) = extract_org_priority(title);
        let mut tags = extract_tags(&text);
        for tag in heading_tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(ParsedLine {
            indent: String::new(),
            list_marker,
            completed: self.core.keywords().is_completed(&state),
            state,
            text,
            tail: String::new(),
            priority,
            tags,
            quote_nesting_level: stars.len(),
            footnote_reference: None,
            embed_reference: None,
        })
    }
}

fn block_skip_reason(kind: &str) -> SkipReason {
    if kind.eq_ignore_ascii_case("comment") {
        SkipReason::InCommentBlock
    } else {
        SkipReason::InCodeBlock
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '@' || c == '+'
}

/// Split a trailing `:tag1:tag2:` group off a headline title.
pub fn split_heading_tags(title: &str) -> (&str, Vec<String>) {
    let title = title.trim_end();
    let start = match title.rfind(" :").or_else(|| title.rfind("\t:")) {
        Some(pos) => pos + 1,
        None if title.starts_with(':') => 0,
        None => return (title, Vec::new()),
    };

    let trail = &title[start..];
    if trail.len() < 3 || !trail.ends_with(':') {
        return (title, Vec::new());
    }
    let parts: Vec<&str> = trail[1..trail.len() - 1].split(':').collect();
    if parts.iter().any(|p| p.is_empty() || !p.chars().all(is_tag_char)) {
        return (title, Vec::new());
    }

    let tags = parts.iter().map(|p| format!("#{}", p)).collect();
    (title[..start].trim_end(), tags)
}

/// Remove the first org priority cookie (`[#A]` or `#A`) and collapse whitespace.
pub fn extract_org_priority(title: &str) -> (String, Option<Priority>) {
    match ORG_PRIORITY.captures(title) {
        Some(caps) => {
            let range = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let text = format!("{} {}", &title[..range.start], &title[range.end..]);
            (collapse_whitespace(&text), Priority::from_letter(&caps[1]))
        }
        None => (collapse_whitespace(title), None),
    }
}
