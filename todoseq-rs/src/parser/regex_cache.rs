//! Compiled-pattern memoization.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Compiled regexes keyed by their source string.
///
/// Two builds that produce the same pattern text share one compiled `Regex`.
/// Reads may happen concurrently; writes only happen while a grammar is built.
#[derive(Debug, Default)]
pub struct RegexCache {
    entries: RwLock<HashMap<String, Arc<Regex>>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached regex for `source`, compiling it on first use.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<Regex>, regex::Error> {
        if let Some(regex) = self.get(source) {
            return Ok(regex);
        }

        let compiled = Arc::new(Regex::new(source)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .entry(source.to_string())
            .or_insert(compiled)
            .clone())
    }

    pub fn get(&self, source: &str) -> Option<Arc<Regex>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(source).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Escape every regex metacharacter in a keyword.
pub fn escape_keyword(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(
            c,
            '\\' | '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A single alternation group (without the parentheses) matching any keyword.
pub fn keyword_alternation(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| escape_keyword(k))
        .collect::<Vec<_>>()
        .join("|")
}
