//! Task-related CLI commands.

use crate::cli::args::{ExplainArgs, SortOrder, TasksArgs};
use crate::cli::output::Output;
use crate::config::Config;
use crate::error::{Result, TodoseqError};
use crate::keywords::KeywordManager;
use crate::parser::{OrgModeTaskParser, TaskParser};
use crate::types::{LineResult, Priority, SkipReason, Task};
use chrono::NaiveDate;
use glob::glob;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Patterns used inside directories when no `--glob` is given.
const DEFAULT_PATTERNS: &[&str] = &["**/*.md", "**/*.org"];

/// Output for the tasks command.
#[derive(Debug, Serialize)]
pub struct TasksOutput {
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// One line of `explain` output.
#[derive(Debug, Serialize)]
pub struct ExplainedLine {
    /// Line number (1-indexed, as editors show it).
    pub line: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

#[derive(Debug, Serialize)]
pub struct ExplainOutput {
    pub path: PathBuf,
    pub parser: &'static str,
    pub lines: Vec<ExplainedLine>,
}

/// Output for the keywords command.
#[derive(Debug, Serialize)]
pub struct KeywordsOutput {
    pub pending: Vec<String>,
    pub active: Vec<String>,
    pub waiting: Vec<String>,
    pub additional: Vec<String>,
    pub completed: Vec<String>,
    pub archived: Vec<String>,
}

impl From<&KeywordManager> for KeywordsOutput {
    fn from(keywords: &KeywordManager) -> Self {
        Self {
            pending: keywords.pending().to_vec(),
            active: keywords.active().to_vec(),
            waiting: keywords.waiting().to_vec(),
            additional: keywords.additional().to_vec(),
            completed: keywords.completed().to_vec(),
            archived: keywords.archived().to_vec(),
        }
    }
}

/// Filter options for task queries.
#[derive(Debug, Default)]
pub struct TaskFilter {
    pub states: Vec<String>,
    pub priority: Option<Priority>,
    pub incomplete: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if !self.states.is_empty() && !self.states.contains(&task.state) {
            return false;
        }
        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }
        if self.incomplete && task.completed {
            return false;
        }
        true
    }
}

/// A markdown and an org parser sharing one configuration.
pub struct Parsers {
    markdown: TaskParser,
    org: OrgModeTaskParser,
    force_org: bool,
}

impl Parsers {
    pub fn new(config: &Config, today: Option<NaiveDate>, force_org: bool) -> Self {
        let mut markdown = TaskParser::from_config(config);
        let mut org = OrgModeTaskParser::from_config(config);
        if let Some(today) = today {
            markdown = markdown.with_today(today);
            org = org.with_today(today);
        }
        Self {
            markdown,
            org,
            force_org,
        }
    }

    /// Whether `path` is read with the org parser.
    pub fn is_org(&self, path: &Path) -> bool {
        self.force_org || path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("org"))
    }

    pub fn parse(&self, content: &str, path: &Path) -> Vec<Task> {
        if self.is_org(path) {
            if !self.org.has_any_keyword(content) {
                return Vec::new();
            }
            self.org.parse_file(content, path)
        } else {
            if !self.markdown.has_any_keyword(content) {
                return Vec::new();
            }
            self.markdown.parse_file(content, path)
        }
    }

    pub fn explain(&self, content: &str, path: &Path) -> Vec<LineResult> {
        if self.is_org(path) {
            self.org.parse_file_detailed(content, path)
        } else {
            self.markdown.parse_file_detailed(content, path)
        }
    }
}

/// Expand the given files and directories into a sorted list of files.
pub fn collect_files(paths: &[PathBuf], pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(TodoseqError::FileNotFound(path.clone()));
        }

        let patterns: Vec<&str> = match pattern {
            Some(p) => vec![p],
            None => DEFAULT_PATTERNS.to_vec(),
        };
        for p in patterns {
            let full = path.join(p);
            for entry in glob(&full.to_string_lossy())? {
                match entry {
                    Ok(found) => {
                        let hidden = found
                            .strip_prefix(path)
                            .unwrap_or(&found)
                            .components()
                            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
                        if found.is_file() && !hidden {
                            files.push(found);
                        }
                    }
                    Err(e) => tracing::warn!("glob error: {}", e),
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Sort by urgency (descending, unscored last), then by position.
pub fn sort_tasks(tasks: &mut [Task], order: SortOrder) {
    let by_position = |a: &Task, b: &Task| a.path.cmp(&b.path).then(a.line.cmp(&b.line));
    match order {
        SortOrder::Line => tasks.sort_by(by_position),
        SortOrder::Urgency => tasks.sort_by(|a, b| {
            match (a.urgency, b.urgency) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| by_position(a, b))
        }),
    }
}

/// `todoseq tasks`
pub fn tasks(config: &Config, args: &TasksArgs, output: &Output) -> Result<()> {
    let filter = TaskFilter {
        states: args.state.clone(),
        priority: args.priority,
        incomplete: args.incomplete,
    };

    let files = collect_files(&args.paths, args.glob.as_deref())?;
    if files.is_empty() {
        return Err(TodoseqError::NoInput);
    }

    let parsers = Parsers::new(config, args.today, args.org);
    let mut all_tasks = Vec::new();

    for file in &files {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping {}: {}", file.display(), e);
                continue;
            }
        };
        all_tasks.extend(
            parsers
                .parse(&content, file)
                .into_iter()
                .filter(|t| filter.matches(t)),
        );
    }

    sort_tasks(&mut all_tasks, args.sort);
    if let Some(limit) = args.limit {
        all_tasks.truncate(limit);
    }

    output.info(&format!("{} task(s) in {} file(s)", all_tasks.len(), files.len()));
    output.print(&TasksOutput {
        count: all_tasks.len(),
        tasks: all_tasks,
    })
}

/// `todoseq explain`
pub fn explain(config: &Config, args: &ExplainArgs, output: &Output) -> Result<()> {
    if !args.path.is_file() {
        return Err(TodoseqError::FileNotFound(args.path.clone()));
    }
    let content = fs::read_to_string(&args.path)?;
    let parsers = Parsers::new(config, args.today, args.org);
    let lines: Vec<&str> = content.lines().collect();

    let explained = parsers
        .explain(&content, &args.path)
        .into_iter()
        .map(|result| ExplainedLine {
            line: result.line + 1,
            text: lines.get(result.line).copied().unwrap_or_default().to_string(),
            skipped: result.skip_reason(),
            task: result.outcome.ok(),
        })
        .collect();

    output.print(&ExplainOutput {
        path: args.path.clone(),
        parser: if parsers.is_org(&args.path) { "org" } else { "markdown" },
        lines: explained,
    })
}

/// `todoseq keywords`
pub fn keywords(config: &Config, output: &Output) -> Result<()> {
    let keywords = KeywordManager::from_settings(&config.parser);
    output.print(&KeywordsOutput::from(&keywords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn task(path: &str, line: usize, urgency: Option<f64>) -> Task {
        let parser = TaskParser::default();
        let mut task = parser
            .parse_line("TODO something", line, Path::new(path))
            .unwrap();
        task.urgency = urgency;
        task
    }

    #[test]
    fn test_collect_files_skips_hidden_and_other_extensions() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join("a.md"), "TODO a").unwrap();
        fs::write(dir.path().join("sub/b.org"), "* TODO b").unwrap();
        fs::write(dir.path().join("c.txt"), "TODO c").unwrap();
        fs::write(dir.path().join(".obsidian/d.md"), "TODO d").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], None).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.org"]);

        let txt = collect_files(&[dir.path().to_path_buf()], Some("*.txt")).unwrap();
        assert_eq!(txt.len(), 1);
    }

    #[test]
    fn test_collect_files_missing_path() {
        let err = collect_files(&[PathBuf::from("/definitely/not/here")], None).unwrap_err();
        assert!(matches!(err, TodoseqError::FileNotFound(_)));
    }

    #[test]
    fn test_sort_by_urgency() {
        let mut tasks = vec![
            task("b.md", 0, Some(1.0)),
            task("a.md", 3, None),
            task("a.md", 1, Some(5.0)),
            task("a.md", 0, Some(1.0)),
        ];
        sort_tasks(&mut tasks, SortOrder::Urgency);
        let order: Vec<(String, usize)> = tasks
            .iter()
            .map(|t| (t.path.display().to_string(), t.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.md".to_string(), 1),
                ("a.md".to_string(), 0),
                ("b.md".to_string(), 0),
                ("a.md".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_filter() {
        let parser = TaskParser::default();
        let todo = parser.parse_line("TODO [#A] a", 0, Path::new("x.md")).unwrap();
        let done = parser.parse_line("DONE b", 1, Path::new("x.md")).unwrap();

        let filter = TaskFilter {
            incomplete: true,
            ..Default::default()
        };
        assert!(filter.matches(&todo));
        assert!(!filter.matches(&done));

        let filter = TaskFilter {
            states: vec!["DONE".to_string()],
            ..Default::default()
        };
        assert!(!filter.matches(&todo));
        assert!(filter.matches(&done));

        let filter = TaskFilter {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert!(filter.matches(&todo));
        assert!(!filter.matches(&done));
    }

    #[test]
    fn test_org_extension_selects_org_parser() {
        let parsers = Parsers::new(&Config::default(), None, false);
        assert!(parsers.is_org(Path::new("agenda.org")));
        assert!(!parsers.is_org(Path::new("note.md")));

        let tasks = parsers.parse("* TODO [#B] Call Bob :phone:", Path::new("agenda.org"));
        assert_eq!(tasks[0].tags, vec!["#phone"]);
        assert_eq!(tasks[0].quote_nesting_level, 1);
    }
}
