//! Todoseq - extract TODO-style tasks from notes and rank them by urgency.
//!
//! # Overview
//!
//! Todoseq reads markdown and org-mode text and returns every line that
//! starts with a task keyword (`TODO`, `DOING`, `DONE`, ...):
//! - List markers, checkboxes, quotes and comment tokens before the keyword
//! - Code, comment, math and callout blocks tracked per line
//! - `SCHEDULED:` / `DEADLINE:` lines associated with the task above
//! - `[#A]`-style priorities and `#tags`
//! - An urgency score for every incomplete task
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use todoseq::{Priority, TaskParser};
//!
//! let parser = TaskParser::default();
//! let tasks = parser.parse_file("- [x] DONE Buy milk [#A]", Path::new("inbox.md"));
//!
//! assert_eq!(tasks.len(), 1);
//! assert_eq!(tasks[0].text, "Buy milk");
//! assert_eq!(tasks[0].priority, Some(Priority::High));
//! assert!(tasks[0].urgency.is_none());
//! ```

pub mod cli;
pub mod config;
pub mod daily_note;
pub mod error;
pub mod keywords;
pub mod parser;
pub mod types;
pub mod urgency;

// Re-export main types at crate root
pub use config::{Config, ParserSettings};
pub use daily_note::{DailyNoteDetector, FilenameDailyNotes};
pub use error::{Result, TodoseqError};
pub use keywords::KeywordManager;
pub use parser::{OrgModeTaskParser, TaskParser};
pub use types::*;
pub use urgency::{calculate_urgency, UrgencyCoefficients};
