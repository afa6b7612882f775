//! Parser settings and the on-disk configuration file.

use crate::error::{Result, TodoseqError};
use crate::urgency::UrgencyCoefficients;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TODOSEQ_CONFIG";

/// Options that control which lines are read as tasks and how they are scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Extract tasks inside fenced code blocks.
    pub include_code_blocks: bool,

    /// Extract tasks inside `%% ... %%` comment blocks.
    pub include_comment_blocks: bool,

    /// Extract tasks inside `> [!type]` callouts.
    pub include_callout_blocks: bool,

    /// Language-aware comment matching inside code blocks.
    pub language_comment_support: LanguageCommentSupport,

    /// Treat `- [ ] text` without a keyword as a task.
    pub include_bare_checkboxes: bool,

    /// Extra keywords treated as pending states.
    pub additional_task_keywords: Vec<String>,

    /// Extra keywords treated as active states.
    pub additional_active_keywords: Vec<String>,

    /// Extra keywords treated as waiting states.
    pub additional_waiting_keywords: Vec<String>,

    /// Extra keywords treated as completed states.
    pub additional_completed_keywords: Vec<String>,

    /// Weights for the urgency score.
    pub urgency_coefficients: UrgencyCoefficients,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            include_code_blocks: false,
            include_comment_blocks: false,
            include_callout_blocks: true,
            language_comment_support: LanguageCommentSupport::default(),
            include_bare_checkboxes: false,
            additional_task_keywords: Vec::new(),
            additional_active_keywords: Vec::new(),
            additional_waiting_keywords: Vec::new(),
            additional_completed_keywords: Vec::new(),
            urgency_coefficients: UrgencyCoefficients::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageCommentSupport {
    pub enabled: bool,
}

impl Default for LanguageCommentSupport {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// How daily notes are recognized from their file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyNotesConfig {
    pub enabled: bool,

    /// chrono format string matched against the file stem.
    pub format: String,

    /// Only files under this folder (relative) count as daily notes.
    pub folder: Option<String>,
}

impl Default for DailyNotesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "%Y-%m-%d".to_string(),
            folder: None,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserSettings,
    pub daily_notes: DailyNotesConfig,
}

impl Config {
    /// Load the config from `$TODOSEQ_CONFIG` or the user config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the config from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(TodoseqError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `$TODOSEQ_CONFIG`, else `<config dir>/todoseq/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("todoseq").join("config.toml"))
    }
}
