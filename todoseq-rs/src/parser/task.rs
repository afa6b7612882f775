//! Markdown task extraction.
//!
//! [`TaskParser`] ties the pieces together: block context per line, the line
//! grammar, planning-line lookahead, daily-note detection and urgency.

use crate::config::{Config, ParserSettings};
use crate::daily_note::{detect_or_default, DailyNoteDetector, FilenameDailyNotes};
use crate::keywords::KeywordManager;
use crate::parser::context::{classify_lines, BlockContextTracker};
use crate::parser::line::{strip_footnote_definition, ParsedLine, TaskLineParser};
use crate::parser::patterns::{build_grammar, grammar_key, Grammar};
use crate::parser::planning::{associate_dates, PlanningDates, PlanningStyle};
use crate::parser::regex_cache::RegexCache;
use crate::types::{DailyNoteInfo, LineResult, SkipReason, Task};
use crate::urgency::calculate_urgency;
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::sync::{Arc, LazyLock};

// Grammar for the built-in keywords, used when a configured grammar fails to build
static DEFAULT_GRAMMAR: LazyLock<Arc<Grammar>> = LazyLock::new(|| {
    let keywords = KeywordManager::default().all_keywords();
    Arc::new(build_grammar(&keywords, &RegexCache::new()).unwrap())
});

/// State shared by the markdown and org parsers.
pub(crate) struct ParserCore {
    settings: ParserSettings,
    keywords: KeywordManager,
    cache: RegexCache,
    grammar: Arc<Grammar>,
    grammar_key: u64,
    daily_notes: Option<Arc<dyn DailyNoteDetector>>,
    today: Option<NaiveDate>,
}

impl ParserCore {
    pub(crate) fn new(settings: ParserSettings) -> Self {
        let keywords = KeywordManager::from_settings(&settings);
        let all = keywords.all_keywords();
        let cache = RegexCache::new();
        let grammar = compile(&all, &cache);
        Self {
            settings,
            keywords,
            cache,
            grammar,
            grammar_key: grammar_key(&all),
            daily_notes: None,
            today: None,
        }
    }

    /// Swap in new settings, rebuilding the grammar only if the keywords changed.
    pub(crate) fn update(&mut self, settings: ParserSettings) {
        let keywords = KeywordManager::from_settings(&settings);
        let all = keywords.all_keywords();
        let key = grammar_key(&all);
        if key != self.grammar_key {
            tracing::debug!("rebuilding task grammar for {} keywords", all.len());
            self.grammar = compile(&all, &self.cache);
            self.grammar_key = key;
        }
        self.keywords = keywords;
        self.settings = settings;
    }

    pub(crate) fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub(crate) fn keywords(&self) -> &KeywordManager {
        &self.keywords
    }

    pub(crate) fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub(crate) fn set_daily_notes(&mut self, detector: Arc<dyn DailyNoteDetector>) {
        self.daily_notes = Some(detector);
    }

    pub(crate) fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    pub(crate) fn line_parser(&self) -> TaskLineParser<'_> {
        TaskLineParser::new(&self.grammar, &self.keywords, &self.settings)
    }

    pub(crate) fn daily_note_info(&self, path: &Path) -> DailyNoteInfo {
        detect_or_default(self.daily_notes.as_deref(), path)
    }

    /// Assemble a task from its parsed line and attach the score.
    pub(crate) fn finish(
        &self,
        parsed: ParsedLine,
        path: &Path,
        line: usize,
        raw_text: &str,
        dates: PlanningDates,
        daily: DailyNoteInfo,
    ) -> Task {
        let mut task = Task {
            path: path.to_path_buf(),
            line,
            raw_text: raw_text.to_string(),
            indent: parsed.indent,
            list_marker: parsed.list_marker,
            text: parsed.text,
            state: parsed.state,
            completed: parsed.completed,
            priority: parsed.priority,
            scheduled_date: dates.scheduled,
            deadline_date: dates.deadline,
            tail: parsed.tail,
            urgency: None,
            tags: parsed.tags,
            is_daily_note: daily.is_daily_note,
            daily_note_date: daily.date,
            quote_nesting_level: parsed.quote_nesting_level,
            footnote_reference: parsed.footnote_reference,
            embed_reference: parsed.embed_reference,
        };
        task.urgency = calculate_urgency(
            &task,
            &self.settings.urgency_coefficients,
            &self.keywords,
            self.today(),
        );
        task
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn compile(keywords: &[String], cache: &RegexCache) -> Arc<Grammar> {
    match build_grammar(keywords, cache) {
        Ok(grammar) => Arc::new(grammar),
        Err(e) => {
            tracing::warn!("falling back to built-in keywords: {}", e);
            Arc::clone(&DEFAULT_GRAMMAR)
        }
    }
}

/// Extracts tasks from markdown notes.
///
/// A parser holds its configuration and compiled grammar. Parsing borrows it
/// immutably, so one instance can serve concurrent `parse_file` calls;
/// [`TaskParser::update_config`] takes `&mut self` and cannot overlap them.
pub struct TaskParser {
    core: ParserCore,
}

impl Default for TaskParser {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

impl TaskParser {
    pub fn new(settings: ParserSettings) -> Self {
        Self {
            core: ParserCore::new(settings),
        }
    }

    /// Parser settings plus filename-based daily-note detection from `config`.
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

    /// Fix the date urgency is measured against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.core.set_today(today);
        self
    }

    /// Replace the configuration between parse passes.
    pub fn update_config(&mut self, settings: ParserSettings) {
        self.core.update(settings);
    }

    pub fn settings(&self) -> &ParserSettings {
        self.core.settings()
    }

    pub fn keywords(&self) -> &KeywordManager {
        self.core.keywords()
    }

    pub fn grammar(&self) -> &Grammar {
        self.core.grammar()
    }

    /// Every task in `content`, in line order.
    pub fn parse_file(&self, content: &str, path: &Path) -> Vec<Task> {
        self.parse_file_detailed(content, path)
            .into_iter()
            .filter_map(|result| result.outcome.ok())
            .collect()
    }

    /// One outcome per line: the task, or why the line was skipped.
    pub fn parse_file_detailed(&self, content: &str, path: &Path) -> Vec<LineResult> {
        let lines: Vec<&str> = content.lines().collect();
        let contexts = classify_lines(&lines);
        let daily = self.core.daily_note_info(path);
        let line_parser = self.core.line_parser();

        lines
            .iter()
            .zip(contexts.iter())
            .enumerate()
            .map(|(idx, (line, ctx))| {
                let outcome = line_parser.parse(line, ctx).map(|parsed| {
                    let dates = associate_dates(
                        &lines,
                        idx,
                        Some(contexts.as_slice()),
                        PlanningStyle::Markdown,
                    );
                    self.core.finish(parsed, path, idx, line, dates, daily)
                });
                if let Err(reason) = &outcome {
                    if *reason != SkipReason::NoMatch {
                        tracing::trace!("{}:{} skipped: {}", path.display(), idx + 1, reason);
                    }
                }
                LineResult { line: idx, outcome }
            })
            .collect()
    }

    /// Parse a single line out of context; planning lines are not consulted.
    pub fn parse_line(&self, line: &str, line_number: usize, path: &Path) -> Option<Task> {
        let ctx = BlockContextTracker::new().advance(line);
        let parsed = self.core.line_parser().parse(line, &ctx).ok()?;
        let daily = self.core.daily_note_info(path);
        Some(
            self.core
                .finish(parsed, path, line_number, line, PlanningDates::default(), daily),
        )
    }

    /// Whether `line` has task syntax, ignoring block context.
    pub fn is_task_line(&self, line: &str) -> bool {
        self.core.line_parser().is_task_line(line)
    }

    /// Cheap pre-filter: `false` guarantees `parse_file` returns nothing.
    pub fn has_any_keyword(&self, content: &str) -> bool {
        has_any_keyword(&self.core, content)
    }
}

pub(crate) fn has_any_keyword(core: &ParserCore, content: &str) -> bool {
    if core
        .keywords()
        .all_keywords()
        .iter()
        .any(|keyword| content.contains(keyword.as_str()))
    {
        return true;
    }
    core.settings().include_bare_checkboxes
        && content
            .lines()
            .any(|line| core.grammar().checkbox.is_match(strip_footnote_definition(line)))
}
