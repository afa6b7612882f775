//! Daily-note detection.
//!
//! The parser asks a [`DailyNoteDetector`] whether a file is a daily note and
//! which day it belongs to. Detector failures never reach the caller: the
//! parser logs them and treats the file as a regular note.

use crate::config::DailyNotesConfig;
use crate::error::{Result, TodoseqError};
use crate::types::DailyNoteInfo;
use chrono::NaiveDate;
use std::path::Path;

/// Something that can tell whether a file is a daily note.
pub trait DailyNoteDetector: Send + Sync {
    fn detect(&self, path: &Path) -> Result<DailyNoteInfo>;
}

/// Run a detector, degrading any failure to "not a daily note".
pub fn detect_or_default(detector: Option<&dyn DailyNoteDetector>, path: &Path) -> DailyNoteInfo {
    let Some(detector) = detector else {
        return DailyNoteInfo::default();
    };
    match detector.detect(path) {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!("daily note detection failed for {}: {}", path.display(), e);
            DailyNoteInfo::default()
        }
    }
}

/// Recognizes daily notes by parsing the file stem with a chrono format.
#[derive(Debug, Clone)]
pub struct FilenameDailyNotes {
    format: String,
    folder: Option<String>,
}

impl FilenameDailyNotes {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            folder: None,
        }
    }

    /// Only consider files below `folder`.
    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn from_config(config: &DailyNotesConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let detector = Self::new(config.format.clone());
        Some(match &config.folder {
            Some(folder) => detector.in_folder(folder.clone()),
            None => detector,
        })
    }
}

impl DailyNoteDetector for FilenameDailyNotes {
    fn detect(&self, path: &Path) -> Result<DailyNoteInfo> {
        if self.format.trim().is_empty() {
            return Err(TodoseqError::DailyNote("empty daily note format".to_string()));
        }

        if let Some(folder) = &self.folder {
            let wanted: Vec<_> = Path::new(folder.trim_matches('/')).components().collect();
            let have: Vec<_> = path.components().collect();
            if !wanted.is_empty() && !have.windows(wanted.len()).any(|w| w == wanted.as_slice()) {
                return Ok(DailyNoteInfo::default());
            }
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Ok(DailyNoteInfo::default());
        };

        match NaiveDate::parse_from_str(stem, &self.format) {
            Ok(date) => Ok(DailyNoteInfo {
                is_daily_note: true,
                date: Some(date),
            }),
            Err(_) => Ok(DailyNoteInfo::default()),
        }
    }
}
