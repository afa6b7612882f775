//! Extraction of task attributes from a single gated line.

use crate::config::ParserSettings;
use crate::keywords::KeywordManager;
use crate::parser::context::LineContext;
use crate::parser::languages;
use crate::parser::patterns::Grammar;
use crate::types::{Priority, SkipReason};
use regex::{Captures, Regex};
use std::sync::LazyLock;

// First [#A]/[#B]/[#C] token with the whitespace around it
static PRIORITY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s*)\[#([ABC])\](\s*)").unwrap()
});

// Footnote definition marker at line start
static FOOTNOTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\[\^[^\]\s]+\]):[ \t]*").unwrap()
});

// Footnote reference at end of body
static TRAILING_FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(\[\^[^\]\s]+\])\s*$").unwrap()
});

// Block reference at end of body
static TRAILING_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(\^[a-zA-Z0-9_-]+)\s*$").unwrap()
});

// Tag: # then a letter or underscore, not preceded by a word char or &
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w&])#([a-zA-Z_][\w/-]*)").unwrap()
});

/// Attributes of a task line, before file-level data is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub indent: String,
    pub list_marker: String,
    pub state: String,
    pub text: String,
    pub tail: String,
    pub completed: bool,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub quote_nesting_level: usize,
    pub footnote_reference: Option<String>,
    pub embed_reference: Option<String>,
}

/// Picks the grammar for a line's context and extracts task attributes.
pub struct TaskLineParser<'a> {
    grammar: &'a Grammar,
    keywords: &'a KeywordManager,
    settings: &'a ParserSettings,
}

impl<'a> TaskLineParser<'a> {
    pub fn new(
        grammar: &'a Grammar,
        keywords: &'a KeywordManager,
        settings: &'a ParserSettings,
    ) -> Self {
        Self {
            grammar,
            keywords,
            settings,
        }
    }

    /// Parse one line in its block context.
    pub fn parse(&self, line: &str, ctx: &LineContext) -> Result<ParsedLine, SkipReason> {
        ctx.gate(self.settings)?;

        if ctx.is_footnote_definition {
            if let Some(m) = FOOTNOTE_PREFIX.captures(line) {
                let prefix = m.get(0).map(|p| p.as_str()).unwrap_or("");
                let reference = m[1].to_string();
                let mut parsed = self.parse_generic(&line[prefix.len()..])?;
                parsed.list_marker = format!("{}{}{}", prefix, parsed.indent, parsed.list_marker);
                parsed.indent = String::new();
                parsed.footnote_reference = Some(reference);
                parsed.quote_nesting_level = ctx.quote_depth;
                return Ok(parsed);
            }
        }

        let mut parsed = match self.language_grammar(ctx) {
            Some(re) => match re.captures(line) {
                Some(caps) => self.extract(&caps),
                None if self.grammar.task.is_match(line) => Err(SkipReason::MissingCommentMarker),
                None => Err(SkipReason::NoMatch),
            },
            None => self.parse_generic(line),
        }?;
        parsed.quote_nesting_level = ctx.quote_depth;
        Ok(parsed)
    }

    /// Whether `line` has task syntax under the generic grammar, ignoring context.
    pub fn is_task_line(&self, line: &str) -> bool {
        let body = strip_footnote_definition(line);
        self.grammar.task.is_match(body)
            || (self.settings.include_bare_checkboxes && self.grammar.checkbox.is_match(body))
    }

    fn language_grammar(&self, ctx: &LineContext) -> Option<&'a Regex> {
        if !ctx.in_code_block || !self.settings.language_comment_support.enabled {
            return None;
        }
        let lang = languages::lookup(ctx.code_language.as_deref()?)?;
        self.grammar.language(lang.name)
    }

    fn parse_generic(&self, line: &str) -> Result<ParsedLine, SkipReason> {
        if let Some(caps) = self.grammar.task.captures(line) {
            return self.extract(&caps);
        }
        if self.settings.include_bare_checkboxes {
            if let Some(caps) = self.grammar.checkbox.captures(line) {
                return self.extract(&caps);
            }
        }
        Err(SkipReason::NoMatch)
    }

    fn extract(&self, caps: &Captures) -> Result<ParsedLine, SkipReason> {
        let group = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or("");

        let state = group("state").to_string();
        let glyph = caps.name("glyph").and_then(|m| m.as_str().chars().next());
        let completed = match glyph {
            Some(g) => g == 'x',
            None => self.keywords.is_completed(&state),
        };

        let (body, embed_reference, footnote_reference) = split_trailing_references(group("body"));
        let (text, priority) = extract_priority(&body);
        let tags = extract_tags(&text);

        Ok(ParsedLine {
            indent: group("indent").to_string(),
            list_marker: group("marker").to_string(),
            state,
            text,
            tail: group("tail").to_string(),
            completed,
            priority,
            tags,
            quote_nesting_level: 0,
            footnote_reference,
            embed_reference,
        })
    }
}

/// Strip a trailing `^block-id` and `[^n]` reference from the body, in either order.
pub fn split_trailing_references(body: &str) -> (String, Option<String>, Option<String>) {
    let mut rest = body.to_string();
    let mut embed = None;
    let mut footnote = None;

    for _ in 0..2 {
        if embed.is_none() {
            if let Some(caps) = TRAILING_EMBED.captures(&rest) {
                embed = Some(caps[1].to_string());
                let start = caps.get(0).map(|m| m.start()).unwrap_or(rest.len());
                rest.truncate(start);
                continue;
            }
        }
        if footnote.is_none() {
            if let Some(caps) = TRAILING_FOOTNOTE.captures(&rest) {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(rest.len());
                // A body that is only a reference keeps it as text.
                if start > 0 {
                    footnote = Some(caps[1].to_string());
                    rest.truncate(start);
                    continue;
                }
            }
        }
        break;
    }

    (rest, embed, footnote)
}

/// Remove the first `[#A]`-style token and collapse whitespace.
pub fn extract_priority(body: &str) -> (String, Option<Priority>) {
    let (cleaned, priority) = match PRIORITY_TOKEN.captures(body) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let priority = Priority::from_letter(&caps[2]);
            let cleaned = format!("{} {}", &body[..whole.start], &body[whole.end..]);
            (cleaned, priority)
        }
        None => (body.to_string(), None),
    };
    (collapse_whitespace(&cleaned), priority)
}

/// The part of `line` after a leading `[^id]: ` footnote definition marker.
pub fn strip_footnote_definition(line: &str) -> &str {
    FOOTNOTE_PREFIX
        .find(line)
        .map(|m| &line[m.end()..])
        .unwrap_or(line)
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Inline `#tags`, excluding the `#A`/`#B`/`#C` priority letters.
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !matches!(*name, "A" | "B" | "C"))
        .map(|name| format!("#{}", name))
        .collect()
}
