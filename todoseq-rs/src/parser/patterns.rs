//! Task grammars built from the current keyword set.
//!
//! A [`Grammar`] is an immutable bundle of compiled patterns. It is rebuilt
//! only when the keyword list changes; [`grammar_key`] identifies a keyword
//! list independently of its order.

use crate::parser::languages::{LanguageComments, LANGUAGES};
use crate::parser::regex_cache::{keyword_alternation, RegexCache};
use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Leading whitespace and any number of `>` quote markers.
const QUOTE_PREFIX: &str = r"[ \t]*(?:>[ \t]*)*";

/// Comment openers that may precede a keyword outside language-aware matching.
const GENERIC_COMMENT_OPEN: &str = r"(?://+|/\*+|%%)[ \t]*";

/// Closers kept as the task tail.
const GENERIC_COMMENT_CLOSE: &str = r"\*+/|%%|-->";

/// Bullet, number, letter or `(a1)` marker, then an optional checkbox.
const LIST_MARKER: &str =
    r"(?:[-*+]|\d+\.|[A-Za-z]\)|\([A-Za-z]\d+\))[ \t]+(?:\[(?P<glyph>[ \-+*x])\][ \t]+)?";

/// Body must start with a non-space character and may contain any script.
const BODY: &str = r"(?P<body>\S.*?)";

/// Matches nothing; stands in for an empty keyword list.
const NEVER: &str = r"[^\s\S]";

/// Compiled task patterns for one keyword set.
#[derive(Debug, Clone)]
pub struct Grammar {
    keywords: Vec<String>,
    /// Markdown line grammar: indent, marker, keyword, body, tail.
    pub task: Arc<Regex>,
    /// `- [ ] body` without a keyword.
    pub checkbox: Arc<Regex>,
    /// `** KEYWORD body` org headlines.
    pub org: Arc<Regex>,
    languages: HashMap<&'static str, Arc<Regex>>,
}

impl Grammar {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The comment grammar for a known language, by canonical name.
    pub fn language(&self, name: &str) -> Option<&Regex> {
        self.languages.get(name).map(|re| re.as_ref())
    }
}

/// Build every grammar for `keywords`, compiling through `cache`.
pub fn build_grammar(keywords: &[String], cache: &RegexCache) -> Result<Grammar, regex::Error> {
    let alternation = if keywords.is_empty() {
        NEVER.to_string()
    } else {
        keyword_alternation(keywords)
    };

    let task = cache.get_or_compile(&task_pattern(&alternation))?;
    let checkbox = cache.get_or_compile(&checkbox_pattern())?;
    let org = cache.get_or_compile(&org_pattern(&alternation))?;

    let mut languages = HashMap::new();
    for lang in LANGUAGES {
        if let Some(pattern) = language_pattern(lang, &alternation) {
            languages.insert(lang.name, cache.get_or_compile(&pattern)?);
        }
    }

    Ok(Grammar {
        keywords: keywords.to_vec(),
        task,
        checkbox,
        org,
        languages,
    })
}

/// Order-independent hash of a keyword list.
pub fn grammar_key(keywords: &[String]) -> u64 {
    let mut sorted: Vec<&String> = keywords.iter().collect();
    sorted.sort();
    let mut hasher = DefaultHasher::new();
    sorted.hash(&mut hasher);
    hasher.finish()
}

/// `^(indent)(marker)?(KEYWORD)\s+(body)(tail)$`
pub fn task_pattern(alternation: &str) -> String {
    format!(
        r"^(?P<indent>{QUOTE_PREFIX}(?:{GENERIC_COMMENT_OPEN})?)(?P<marker>{LIST_MARKER})?(?P<state>{alternation})[ \t]+{BODY}(?P<tail>(?:[ \t]*(?:{GENERIC_COMMENT_CLOSE}))?[ \t]*)$"
    )
}

/// A list item with a checkbox but no keyword.
pub fn checkbox_pattern() -> String {
    format!(
        r"^(?P<indent>{QUOTE_PREFIX})(?P<marker>(?:[-*+]|\d+\.|[A-Za-z]\)|\([A-Za-z]\d+\))[ \t]+\[(?P<glyph>[ \-+*x])\][ \t]+){BODY}(?P<tail>[ \t]*)$"
    )
}

/// `^(\*+)\s+(KEYWORD)\s+(.*)$`
pub fn org_pattern(alternation: &str) -> String {
    format!(r"^(?P<stars>\*+)[ \t]+(?P<state>{alternation})(?:[ \t]+(?P<body>.*?))?[ \t]*$")
}

/// A comment token from `lang`, then the same shape as [`task_pattern`].
pub fn language_pattern(lang: &LanguageComments, alternation: &str) -> Option<String> {
    let open = lang.open_alternation()?;
    let close = match lang.multi_line_end {
        Some(end) => format!(r"(?:[ \t]*(?:{end}))?"),
        None => String::new(),
    };
    Some(format!(
        r"^(?P<indent>{QUOTE_PREFIX}(?:{open})[ \t]*)(?P<marker>{LIST_MARKER})?(?P<state>{alternation})[ \t]+{BODY}(?P<tail>{close}[ \t]*)$"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordManager;
    use crate::parser::languages::lookup;

    fn grammar() -> Grammar {
        build_grammar(&KeywordManager::default().all_keywords(), &RegexCache::new()).unwrap()
    }

    fn caps<'a>(re: &Regex, line: &'a str, name: &str) -> Option<&'a str> {
        re.captures(line).and_then(|c| c.name(name)).map(|m| m.as_str())
    }

    #[test]
    fn test_plain_keyword_line() {
        let g = grammar();
        assert_eq!(caps(&g.task, "TODO write report", "state"), Some("TODO"));
        assert_eq!(caps(&g.task, "TODO write report", "body"), Some("write report"));
        assert_eq!(caps(&g.task, "  DONE indented", "indent"), Some("  "));
    }

    #[test]
    fn test_list_markers() {
        let g = grammar();
        for line in [
            "- TODO a",
            "* TODO a",
            "+ TODO a",
            "12. TODO a",
            "b) TODO a",
            "(A1) TODO a",
            "- [ ] TODO a",
            "- [x] DONE a",
            "3. [-] TODO a",
            "> - [ ] TODO a",
            "> > TODO a",
        ] {
            assert!(g.task.is_match(line), "should match: {}", line);
        }
    }

    #[test]
    fn test_malformed_markers_rejected() {
        let g = grammar();
        for line in [
            "A1) TODO x",
            "1/ TODO x",
            "2> TODO x",
            "-TODO x",
            "[ ] TODO x",
            "TODOx",
            "TODO",
            "TODO   ",
            "todo lowercase",
        ] {
            assert!(!g.task.is_match(line), "should not match: {}", line);
        }
    }

    #[test]
    fn test_checkbox_glyph() {
        let g = grammar();
        assert_eq!(caps(&g.task, "- [x] DONE a", "glyph"), Some("x"));
        assert_eq!(caps(&g.task, "- [ ] TODO a", "glyph"), Some(" "));
        assert_eq!(caps(&g.task, "- TODO a", "glyph"), None);
        assert!(!g.task.is_match("- [y] TODO a"));
    }

    #[test]
    fn test_comment_tokens_in_generic_grammar() {
        let g = grammar();
        assert_eq!(caps(&g.task, "// TODO fix this", "indent"), Some("// "));
        assert_eq!(caps(&g.task, "/* TODO fix this */", "body"), Some("fix this"));
        assert_eq!(caps(&g.task, "/* TODO fix this */", "tail"), Some(" */"));
        assert_eq!(caps(&g.task, "%% TODO hidden %%", "tail"), Some(" %%"));
    }

    #[test]
    fn test_unicode_body() {
        let g = grammar();
        assert_eq!(caps(&g.task, "- TODO 🚀 launch", "body"), Some("🚀 launch"));
        assert_eq!(caps(&g.task, "TODO 日本語のタスク", "body"), Some("日本語のタスク"));
    }

    #[test]
    fn test_org_pattern() {
        let g = grammar();
        assert_eq!(caps(&g.org, "** TODO [#B] Call Bob", "stars"), Some("**"));
        assert_eq!(caps(&g.org, "** TODO [#B] Call Bob", "body"), Some("[#B] Call Bob"));
        assert!(!g.org.is_match("**TODO no space"));
        assert!(!g.org.is_match(" * TODO indented"));
    }

    #[test]
    fn test_language_pattern() {
        let g = grammar();
        let rust = g.language(lookup("rs").unwrap().name).unwrap();
        assert_eq!(caps(rust, "    // TODO handle errors", "body"), Some("handle errors"));
        assert_eq!(caps(rust, "/* FIXME-free DONE ship */", "tail"), None);
        assert_eq!(caps(rust, "/* DONE ship */", "tail"), Some(" */"));
        assert!(!rust.is_match("TODO bare keyword"));

        let python = g.language("python").unwrap();
        assert!(python.is_match("# TODO refactor"));
        assert!(!python.is_match("// TODO refactor"));
    }

    #[test]
    fn test_custom_keyword_is_escaped() {
        let keywords = vec!["TODO".to_string(), "Q?".to_string()];
        let g = build_grammar(&keywords, &RegexCache::new()).unwrap();
        assert!(g.task.is_match("Q? what now"));
        assert!(!g.task.is_match("Q what now"));
    }

    #[test]
    fn test_empty_keywords_match_nothing() {
        let g = build_grammar(&[], &RegexCache::new()).unwrap();
        assert!(!g.task.is_match("TODO a"));
        assert!(!g.org.is_match("* TODO a"));
    }

    #[test]
    fn test_grammar_key_ignores_order() {
        let a = vec!["TODO".to_string(), "DONE".to_string()];
        let b = vec!["DONE".to_string(), "TODO".to_string()];
        let c = vec!["TODO".to_string()];
        assert_eq!(grammar_key(&a), grammar_key(&b));
        assert_ne!(grammar_key(&a), grammar_key(&c));
    }

    #[test]
    fn test_identical_builds_share_regexes() {
        let cache = RegexCache::new();
        let keywords = KeywordManager::default().all_keywords();
        let a = build_grammar(&keywords, &cache).unwrap();
        let b = build_grammar(&keywords, &cache).unwrap();
        assert!(Arc::ptr_eq(&a.task, &b.task));
        assert!(Arc::ptr_eq(&a.org, &b.org));
    }
}
