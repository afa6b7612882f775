//! CLI argument definitions using clap.

use crate::types::Priority;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "todoseq")]
#[command(author, version, about = "Extract tasks from markdown and org notes", long_about = None)]
pub struct Cli {
    /// Path to a config file (overrides $TODOSEQ_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (default)
    #[arg(long, global = true, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output as YAML
    #[arg(long, global = true, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output as TOML
    #[arg(long, global = true, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.toml {
            OutputFormat::Toml
        } else {
            OutputFormat::Json
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract tasks from files and directories
    Tasks(TasksArgs),

    /// Show, line by line, why each line is or is not a task
    Explain(ExplainArgs),

    /// Print the configured task keywords
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortOrder {
    /// File, then line order
    #[default]
    Line,
    /// Highest urgency first; completed tasks last
    Urgency,
}

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Glob used inside directories (default: **/*.md and **/*.org)
    #[arg(long)]
    pub glob: Option<String>,

    /// Parse every file as org-mode
    #[arg(long)]
    pub org: bool,

    /// Only tasks in this state (repeatable)
    #[arg(long)]
    pub state: Vec<String>,

    /// Only tasks with this priority (high, med, low)
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Skip completed tasks
    #[arg(long)]
    pub incomplete: bool,

    /// Sort order
    #[arg(long, value_enum, default_value_t = SortOrder::Line)]
    pub sort: SortOrder,

    /// Maximum number of tasks to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Score urgency as of this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// File to explain
    pub path: PathBuf,

    /// Parse the file as org-mode
    #[arg(long)]
    pub org: bool,

    /// Score urgency as of this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}
