//! Block context tracking for one pass over a file's lines.
//!
//! A line can be inside several constructs at once (a quoted code fence in a
//! callout, say), so the context is a set of independent flags rather than a
//! single state.

use crate::config::ParserSettings;
use crate::types::SkipReason;
use regex::Regex;
use std::sync::LazyLock;

// Fence opener at any indent (list-nested fences): 3+ backticks or tildes, then an info string
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(`{3,}|~{3,})[ \t]*(.*)$").unwrap()
});

// Callout header: [!type] with an optional fold marker
static CALLOUT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[!\w+\][-+]?").unwrap()
});

// Footnote definition at the start of a line
static FOOTNOTE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\^[^\]\s]+\]:").unwrap()
});

/// Block membership of a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineContext {
    /// Inside a fenced code block (fence lines included).
    pub in_code_block: bool,
    /// The line is an opening or closing fence.
    pub is_fence: bool,
    /// Info-string language of the enclosing fence, lowercased.
    pub code_language: Option<String>,
    /// Number of leading `>` markers.
    pub quote_depth: usize,
    pub in_callout: bool,
    pub in_comment_block: bool,
    pub in_math_block: bool,
    pub is_footnote_definition: bool,
}

impl LineContext {
    /// Decide whether task extraction may look at this line.
    pub fn gate(&self, settings: &ParserSettings) -> Result<(), SkipReason> {
        if self.in_math_block {
            return Err(SkipReason::InMathBlock);
        }
        if self.in_code_block && (self.is_fence || !settings.include_code_blocks) {
            return Err(SkipReason::InCodeBlock);
        }
        if self.in_comment_block && !settings.include_comment_blocks {
            return Err(SkipReason::InCommentBlock);
        }
        if self.in_callout && !settings.include_callout_blocks {
            return Err(SkipReason::InCalloutBlock);
        }
        Ok(())
    }

    /// Whether two lines belong to the same code/comment/math region.
    pub fn same_region(&self, other: &LineContext) -> bool {
        self.in_code_block == other.in_code_block
            && self.in_comment_block == other.in_comment_block
            && self.in_math_block == other.in_math_block
            && !other.is_fence
    }
}

#[derive(Debug, Clone)]
struct Fence {
    ch: char,
    len: usize,
    language: Option<String>,
}

/// Single forward pass over lines, one transition per line.
#[derive(Debug, Clone, Default)]
pub struct BlockContextTracker {
    fence: Option<Fence>,
    in_callout: bool,
    in_comment_block: bool,
    in_math_block: bool,
}

impl BlockContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `line` and advance the state past it.
    pub fn advance(&mut self, line: &str) -> LineContext {
        let (quote_depth, rest) = split_quote_prefix(line);
        let mut ctx = LineContext {
            quote_depth,
            ..Default::default()
        };

        // Callout membership follows the quote, whatever else the line is.
        if quote_depth == 0 {
            self.in_callout = false;
        } else if CALLOUT_HEADER.is_match(rest.trim_start()) {
            self.in_callout = true;
        }
        ctx.in_callout = self.in_callout;

        if let Some(fence) = &self.fence {
            ctx.in_code_block = true;
            ctx.code_language = fence.language.clone();
            if is_closing_fence(rest, fence) {
                ctx.is_fence = true;
                self.fence = None;
            }
            return ctx;
        }

        if self.in_math_block {
            ctx.in_math_block = true;
            if rest.contains("$$") {
                self.in_math_block = false;
            }
            return ctx;
        }

        if self.in_comment_block {
            ctx.in_comment_block = true;
            if rest.contains("%%") {
                self.in_comment_block = false;
            }
            return ctx;
        }

        if let Some(fence) = opening_fence(rest) {
            ctx.in_code_block = true;
            ctx.is_fence = true;
            ctx.code_language = fence.language.clone();
            self.fence = Some(fence);
            return ctx;
        }

        let trimmed = rest.trim_start();
        if trimmed.starts_with("$$") {
            ctx.in_math_block = true;
            if trimmed.matches("$$").count() == 1 {
                self.in_math_block = true;
            }
            return ctx;
        }

        if trimmed.starts_with("%%") {
            ctx.in_comment_block = true;
            if trimmed.matches("%%").count() == 1 {
                self.in_comment_block = true;
            }
            return ctx;
        }

        ctx.is_footnote_definition = quote_depth == 0 && FOOTNOTE_DEFINITION.is_match(line);
        ctx
    }
}

/// Classify every line of a file.
pub fn classify_lines(lines: &[&str]) -> Vec<LineContext> {
    let mut tracker = BlockContextTracker::new();
    lines.iter().map(|line| tracker.advance(line)).collect()
}

/// Count leading `>` markers (whitespace allowed between them).
pub fn split_quote_prefix(line: &str) -> (usize, &str) {
    let mut depth = 0;
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start_matches([' ', '\t']);
        match trimmed.strip_prefix('>') {
            Some(after) => {
                depth += 1;
                rest = after;
            }
            None => {
                return (depth, if depth == 0 { line } else { trimmed });
            }
        }
    }
}

fn opening_fence(rest: &str) -> Option<Fence> {
    let caps = FENCE_OPEN.captures(rest)?;
    let marker = caps.get(1)?.as_str();
    let info = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    let ch = marker.chars().next()?;

    // A backtick info string cannot itself contain backticks (that is inline code).
    if ch == '`' && info.contains('`') {
        return None;
    }

    let language = info
        .split(|c: char| c.is_whitespace() || c == '{' || c == ',')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase());

    Some(Fence {
        ch,
        len: marker.len(),
        language,
    })
}

fn is_closing_fence(rest: &str, fence: &Fence) -> bool {
    let trimmed = rest.trim();
    trimmed.len() >= fence.len && trimmed.chars().all(|c| c == fence.ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts(content: &str) -> Vec<LineContext> {
        let lines: Vec<&str> = content.lines().collect();
        classify_lines(&lines)
    }

    #[test]
    fn test_fenced_code_block_with_language() {
        let ctx = contexts("before\n```rust\n// TODO x\n```\nafter");
        assert!(!ctx[0].in_code_block);
        assert!(ctx[1].in_code_block && ctx[1].is_fence);
        assert_eq!(ctx[1].code_language.as_deref(), Some("rust"));
        assert!(ctx[2].in_code_block && !ctx[2].is_fence);
        assert_eq!(ctx[2].code_language.as_deref(), Some("rust"));
        assert!(ctx[3].is_fence);
        assert!(!ctx[4].in_code_block);
        assert_eq!(ctx[4].code_language, None);
    }

    #[test]
    fn test_fence_family_must_match() {
        let ctx = contexts("~~~\n```\nstill code\n~~~\nout");
        assert!(ctx[1].in_code_block && !ctx[1].is_fence);
        assert!(ctx[2].in_code_block);
        assert!(ctx[3].is_fence);
        assert!(!ctx[4].in_code_block);
    }

    #[test]
    fn test_closing_fence_must_be_long_enough() {
        let ctx = contexts("````\n```\ncode\n````\nout");
        assert!(ctx[1].in_code_block && !ctx[1].is_fence);
        assert!(ctx[3].is_fence);
        assert!(!ctx[4].in_code_block);
    }

    #[test]
    fn test_inline_triple_backticks_are_not_a_fence() {
        let ctx = contexts("```inline``` text\nnext");
        assert!(!ctx[0].in_code_block);
        assert!(!ctx[1].in_code_block);
    }

    #[test]
    fn test_quote_depth_is_per_line() {
        let ctx = contexts("> one\n> > two\n>>three\nnone");
        assert_eq!(ctx[0].quote_depth, 1);
        assert_eq!(ctx[1].quote_depth, 2);
        assert_eq!(ctx[2].quote_depth, 2);
        assert_eq!(ctx[3].quote_depth, 0);
    }

    #[test]
    fn test_quoted_code_block() {
        let ctx = contexts("> ```python\n> # TODO x\n> ```\n> TODO y");
        assert!(ctx[1].in_code_block);
        assert_eq!(ctx[1].quote_depth, 1);
        assert_eq!(ctx[1].code_language.as_deref(), Some("python"));
        assert!(!ctx[3].in_code_block);
    }

    #[test]
    fn test_callout_membership() {
        let ctx = contexts("> [!note]- Title\n> TODO inside\n\n> TODO plain quote");
        assert!(ctx[0].in_callout);
        assert!(ctx[1].in_callout);
        assert!(!ctx[2].in_callout);
        assert!(!ctx[3].in_callout);
    }

    #[test]
    fn test_comment_blocks() {
        let ctx = contexts("%% TODO single %%\nTODO visible\n%%\nTODO hidden\n%%\nTODO after");
        assert!(ctx[0].in_comment_block);
        assert!(!ctx[1].in_comment_block);
        assert!(ctx[2].in_comment_block);
        assert!(ctx[3].in_comment_block);
        assert!(ctx[4].in_comment_block);
        assert!(!ctx[5].in_comment_block);
    }

    #[test]
    fn test_math_blocks() {
        let ctx = contexts("$$\nTODO x\n$$\n$$ TODO y $$\nTODO z");
        assert!(ctx[0].in_math_block);
        assert!(ctx[1].in_math_block);
        assert!(ctx[2].in_math_block);
        assert!(ctx[3].in_math_block);
        assert!(!ctx[4].in_math_block);
    }

    #[test]
    fn test_markers_inside_code_are_ignored() {
        let ctx = contexts("```\n$$\n%%\n```\nTODO x");
        assert!(!ctx[1].in_math_block);
        assert!(!ctx[2].in_comment_block);
        assert!(!ctx[4].in_math_block && !ctx[4].in_comment_block);
    }

    #[test]
    fn test_footnote_definition() {
        let ctx = contexts("[^1]: TODO from footnote\n> [^2]: quoted");
        assert!(ctx[0].is_footnote_definition);
        assert!(!ctx[1].is_footnote_definition);
    }

    #[test]
    fn test_list_nested_fence() {
        let ctx = contexts("- other\n    ```js\n    TODO also code\n    ```\n- TODO after");
        assert!(!ctx[0].in_code_block);
        assert!(ctx[1].in_code_block && ctx[1].is_fence);
        assert_eq!(ctx[1].code_language.as_deref(), Some("js"));
        assert!(ctx[2].in_code_block && !ctx[2].is_fence);
        assert!(ctx[3].is_fence);
        assert!(!ctx[4].in_code_block);
    }

    #[test]
    fn test_gating() {
        let settings = ParserSettings::default();
        let math = LineContext {
            in_math_block: true,
            ..Default::default()
        };
        let everything = ParserSettings {
            include_code_blocks: true,
            include_comment_blocks: true,
            ..Default::default()
        };
        assert_eq!(math.gate(&everything), Err(SkipReason::InMathBlock));

        let code = LineContext {
            in_code_block: true,
            ..Default::default()
        };
        assert_eq!(code.gate(&settings), Err(SkipReason::InCodeBlock));
        assert_eq!(code.gate(&everything), Ok(()));

        let comment = LineContext {
            in_comment_block: true,
            ..Default::default()
        };
        assert_eq!(comment.gate(&settings), Err(SkipReason::InCommentBlock));
        assert_eq!(comment.gate(&everything), Ok(()));

        let callout = LineContext {
            in_callout: true,
            quote_depth: 1,
            ..Default::default()
        };
        assert_eq!(callout.gate(&settings), Ok(()));
        let no_callouts = ParserSettings {
            include_callout_blocks: false,
            ..Default::default()
        };
        assert_eq!(callout.gate(&no_callouts), Err(SkipReason::InCalloutBlock));
    }
}
