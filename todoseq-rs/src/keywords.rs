//! Task-state keyword taxonomy.

use crate::config::ParserSettings;
use std::collections::HashSet;

pub const DEFAULT_PENDING: &[&str] = &["TODO", "LATER"];
pub const DEFAULT_ACTIVE: &[&str] = &["DOING", "NOW", "IN-PROGRESS"];
pub const DEFAULT_WAITING: &[&str] = &["WAIT", "WAITING"];
pub const DEFAULT_COMPLETED: &[&str] = &["DONE", "CANCELED", "CANCELLED"];
pub const DEFAULT_ARCHIVED: &[&str] = &["ARCHIVED"];

/// Owns the keyword groups and answers classification questions.
///
/// Reconfigured wholesale through [`KeywordManager::from_settings`]; never
/// mutated incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordManager {
    pending: Vec<String>,
    active: Vec<String>,
    waiting: Vec<String>,
    additional: Vec<String>,
    completed: Vec<String>,
    archived: Vec<String>,
    active_set: HashSet<String>,
    waiting_set: HashSet<String>,
    completed_set: HashSet<String>,
}

impl Default for KeywordManager {
    fn default() -> Self {
        Self::from_settings(&ParserSettings::default())
    }
}

impl KeywordManager {
    /// Build the taxonomy from the built-in groups plus user additions.
    pub fn from_settings(settings: &ParserSettings) -> Self {
        let pending = normalize(DEFAULT_PENDING.iter().copied().map(String::from));
        let active = normalize(
            DEFAULT_ACTIVE
                .iter()
                .copied()
                .map(String::from)
                .chain(settings.additional_active_keywords.iter().cloned()),
        );
        let waiting = normalize(
            DEFAULT_WAITING
                .iter()
                .copied()
                .map(String::from)
                .chain(settings.additional_waiting_keywords.iter().cloned()),
        );
        let additional = normalize(settings.additional_task_keywords.iter().cloned());
        let completed = normalize(
            DEFAULT_COMPLETED
                .iter()
                .copied()
                .map(String::from)
                .chain(settings.additional_completed_keywords.iter().cloned()),
        );
        let archived = normalize(DEFAULT_ARCHIVED.iter().copied().map(String::from));

        let active_set = active.iter().cloned().collect();
        let waiting_set = waiting.iter().cloned().collect();
        let completed_set = completed.iter().chain(archived.iter()).cloned().collect();

        Self {
            pending,
            active,
            waiting,
            additional,
            completed,
            archived,
            active_set,
            waiting_set,
            completed_set,
        }
    }

    /// Every keyword: pending, active, waiting, additions, completed, archived.
    ///
    /// A keyword listed in more than one group appears once, at its first position.
    pub fn all_keywords(&self) -> Vec<String> {
        normalize(
            self.pending
                .iter()
                .chain(&self.active)
                .chain(&self.waiting)
                .chain(&self.additional)
                .chain(&self.completed)
                .chain(&self.archived)
                .cloned(),
        )
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn waiting(&self) -> &[String] {
        &self.waiting
    }

    pub fn additional(&self) -> &[String] {
        &self.additional
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn archived(&self) -> &[String] {
        &self.archived
    }

    pub fn active_set(&self) -> &HashSet<String> {
        &self.active_set
    }

    pub fn waiting_set(&self) -> &HashSet<String> {
        &self.waiting_set
    }

    /// Completed or archived.
    pub fn is_completed(&self, state: &str) -> bool {
        self.completed_set.contains(state)
    }

    pub fn is_active(&self, state: &str) -> bool {
        self.active_set.contains(state)
    }

    pub fn is_waiting(&self, state: &str) -> bool {
        self.waiting_set.contains(state)
    }

    pub fn is_archived(&self, state: &str) -> bool {
        self.archived.iter().any(|k| k == state)
    }

    pub fn is_keyword(&self, token: &str) -> bool {
        self.all_keywords().iter().any(|k| k == token)
    }
}

/// Trim, drop empties and de-duplicate, keeping first occurrences.
fn normalize(keywords: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_keyword_order() {
        let keywords = KeywordManager::default();
        assert_eq!(
            keywords.all_keywords(),
            vec![
                "TODO", "LATER", "DOING", "NOW", "IN-PROGRESS", "WAIT", "WAITING", "DONE",
                "CANCELED", "CANCELLED", "ARCHIVED"
            ]
        );
    }

    #[test]
    fn test_additions_are_normalized() {
        let settings = ParserSettings {
            additional_task_keywords: vec![
                " FIXME ".to_string(),
                "".to_string(),
                "FIXME".to_string(),
                "TODO".to_string(),
                "   ".to_string(),
            ],
            ..Default::default()
        };
        let keywords = KeywordManager::from_settings(&settings);

        assert_eq!(keywords.additional(), &["FIXME".to_string(), "TODO".to_string()]);
        let all = keywords.all_keywords();
        assert_eq!(all.iter().filter(|k| *k == "TODO").count(), 1);
        assert_eq!(all.iter().position(|k| k == "FIXME"), Some(7));
    }

    #[test]
    fn test_classification() {
        let settings = ParserSettings {
            additional_active_keywords: vec!["STARTED".to_string()],
            additional_waiting_keywords: vec!["BLOCKED".to_string()],
            additional_completed_keywords: vec!["WONTFIX".to_string()],
            ..Default::default()
        };
        let keywords = KeywordManager::from_settings(&settings);

        assert!(keywords.is_completed("DONE"));
        assert!(keywords.is_completed("WONTFIX"));
        assert!(keywords.is_completed("ARCHIVED"));
        assert!(!keywords.is_completed("TODO"));
        assert!(keywords.is_active("STARTED"));
        assert!(keywords.is_active("NOW"));
        assert!(keywords.is_waiting("BLOCKED"));
        assert!(keywords.is_archived("ARCHIVED"));
        assert!(keywords.is_keyword("STARTED"));
        assert!(!keywords.is_keyword("todo"));
    }

    #[test]
    fn test_empty_additions_fall_back_to_builtins() {
        let keywords = KeywordManager::from_settings(&ParserSettings::default());
        assert_eq!(keywords, KeywordManager::default());
        assert!(keywords.pending().contains(&"TODO".to_string()));
    }
}
