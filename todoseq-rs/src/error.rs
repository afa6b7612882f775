//! Error types and exit codes for todoseq.
//!
//! Parsing itself never fails: a line that cannot be read as a task is a
//! [`SkipReason`](crate::types::SkipReason), not an error. These errors cover
//! the outer surfaces (config files, file discovery, output serialization).

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes used by the CLI.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const FILE_NOT_FOUND: i32 = 2;
    pub const INVALID_CONFIG: i32 = 5;
}

/// Main error type for todoseq operations.
#[derive(Error, Debug)]
pub enum TodoseqError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Daily note lookup failed: {0}")]
    DailyNote(String),

    #[error("No input files matched")]
    NoInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),
}

impl TodoseqError {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TodoseqError::FileNotFound(_) | TodoseqError::NoInput => exit_code::FILE_NOT_FOUND,
            TodoseqError::ConfigError(_) | TodoseqError::TomlParse(_) => exit_code::INVALID_CONFIG,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for todoseq operations.
pub type Result<T> = std::result::Result<T, TodoseqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            TodoseqError::FileNotFound(PathBuf::from("a.md")).exit_code(),
            exit_code::FILE_NOT_FOUND
        );
        assert_eq!(TodoseqError::NoInput.exit_code(), exit_code::FILE_NOT_FOUND);
        assert_eq!(
            TodoseqError::ConfigError("bad".to_string()).exit_code(),
            exit_code::INVALID_CONFIG
        );
        assert_eq!(
            TodoseqError::InvalidDate("2026-13-01".to_string()).exit_code(),
            exit_code::GENERAL_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TodoseqError::FileNotFound(PathBuf::from("notes/today.md"));
        assert_eq!(err.to_string(), "File not found: notes/today.md");
    }
}
