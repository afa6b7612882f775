//! Urgency scoring.
//!
//! The score is a weighted sum of independent terms (deadline proximity,
//! priority, scheduled, active, age, tags, waiting). Completed tasks have no
//! score. A computation that would produce a non-finite number yields `None`
//! for that task only.

use crate::keywords::KeywordManager;
use crate::types::{Priority, Task};
use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deadline distance is clamped to this many days in the future...
const DEADLINE_FUTURE_DAYS: i64 = 14;
/// ...and this many days overdue.
const DEADLINE_OVERDUE_DAYS: i64 = 7;
const DAYS_PER_YEAR: f64 = 365.0;

/// Weights applied to each urgency term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCoefficients")]
pub struct UrgencyCoefficients {
    pub deadline: f64,
    pub priority_high: f64,
    pub priority_medium: f64,
    pub priority_low: f64,
    pub scheduled: f64,
    pub active: f64,
    pub age: f64,
    pub tags: f64,
    pub waiting: f64,
}

impl Default for UrgencyCoefficients {
    fn default() -> Self {
        Self {
            deadline: 12.0,
            priority_high: 6.0,
            priority_medium: 3.9,
            priority_low: 1.8,
            scheduled: 5.0,
            active: 4.0,
            age: 2.0,
            tags: 1.0,
            waiting: -3.0,
        }
    }
}

/// A coefficient as written in a config file, before validation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

impl LenientNumber {
    fn resolve(value: Option<LenientNumber>, default: f64) -> f64 {
        let parsed = match value {
            Some(LenientNumber::Number(n)) => Some(n),
            Some(LenientNumber::Text(s)) => s.trim().parse::<f64>().ok(),
            Some(LenientNumber::Other(_)) | None => None,
        };
        match parsed {
            Some(n) if n.is_finite() => n,
            _ => default,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCoefficients {
    deadline: Option<LenientNumber>,
    #[serde(alias = "priorityHigh")]
    priority_high: Option<LenientNumber>,
    #[serde(alias = "priorityMedium")]
    priority_medium: Option<LenientNumber>,
    #[serde(alias = "priorityLow")]
    priority_low: Option<LenientNumber>,
    scheduled: Option<LenientNumber>,
    active: Option<LenientNumber>,
    age: Option<LenientNumber>,
    tags: Option<LenientNumber>,
    waiting: Option<LenientNumber>,
}

impl From<RawCoefficients> for UrgencyCoefficients {
    fn from(raw: RawCoefficients) -> Self {
        let d = UrgencyCoefficients::default();
        Self {
            deadline: LenientNumber::resolve(raw.deadline, d.deadline),
            priority_high: LenientNumber::resolve(raw.priority_high, d.priority_high),
            priority_medium: LenientNumber::resolve(raw.priority_medium, d.priority_medium),
            priority_low: LenientNumber::resolve(raw.priority_low, d.priority_low),
            scheduled: LenientNumber::resolve(raw.scheduled, d.scheduled),
            active: LenientNumber::resolve(raw.active, d.active),
            age: LenientNumber::resolve(raw.age, d.age),
            tags: LenientNumber::resolve(raw.tags, d.tags),
            waiting: LenientNumber::resolve(raw.waiting, d.waiting),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum UrgencyError {
    #[error("{0} term is not a finite number")]
    NonFinite(&'static str),
}

/// Each weighted term of an urgency score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UrgencyTerms {
    pub deadline: f64,
    pub priority: f64,
    pub scheduled: f64,
    pub active: f64,
    pub age: f64,
    pub tags: f64,
    pub waiting: f64,
}

impl UrgencyTerms {
    pub fn total(&self) -> f64 {
        self.deadline
            + self.priority
            + self.scheduled
            + self.active
            + self.age
            + self.tags
            + self.waiting
    }
}

/// Score a task, or `None` if it is completed or the score is not computable.
pub fn calculate_urgency(
    task: &Task,
    coeffs: &UrgencyCoefficients,
    keywords: &KeywordManager,
    today: NaiveDate,
) -> Option<f64> {
    if task.completed {
        return None;
    }
    match urgency_terms(task, coeffs, keywords, today) {
        Ok(terms) => Some(terms.total()),
        Err(e) => {
            tracing::debug!(
                "urgency for {}:{} not computed: {}",
                task.path.display(),
                task.line,
                e
            );
            None
        }
    }
}

/// Compute every term of the score for an incomplete task.
pub fn urgency_terms(
    task: &Task,
    coeffs: &UrgencyCoefficients,
    keywords: &KeywordManager,
    today: NaiveDate,
) -> Result<UrgencyTerms, UrgencyError> {
    let deadline = match task.deadline_date {
        Some(deadline) => {
            let overdue = days_between(deadline.date, today);
            coeffs.deadline * deadline_factor(overdue)
        }
        None => 0.0,
    };

    let priority = match task.priority {
        Some(Priority::High) => coeffs.priority_high,
        Some(Priority::Med) => coeffs.priority_medium,
        Some(Priority::Low) => coeffs.priority_low,
        None => 0.0,
    };

    let scheduled = match task.scheduled_date {
        Some(scheduled) if scheduled.date <= today => coeffs.scheduled,
        _ => 0.0,
    };

    let active = if keywords.is_active(&task.state) {
        coeffs.active
    } else {
        0.0
    };

    let age = coeffs.age * age_factor(task, today);
    let tags = coeffs.tags * tag_factor(task.tags.len());

    let waiting = if keywords.is_waiting(&task.state) {
        coeffs.waiting
    } else {
        0.0
    };

    let terms = UrgencyTerms {
        deadline,
        priority,
        scheduled,
        active,
        age,
        tags,
        waiting,
    };

    for (name, value) in [
        ("deadline", terms.deadline),
        ("priority", terms.priority),
        ("scheduled", terms.scheduled),
        ("active", terms.active),
        ("age", terms.age),
        ("tags", terms.tags),
        ("waiting", terms.waiting),
    ] {
        if !value.is_finite() {
            return Err(UrgencyError::NonFinite(name));
        }
    }
    if !terms.total().is_finite() {
        return Err(UrgencyError::NonFinite("total"));
    }

    Ok(terms)
}

/// Whole calendar days from `from` to `to` (positive when `to` is later).
fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Linear gradient: 14 days ahead -> 0.2, due today -> 0.733, 7 days overdue -> 1.0.
pub fn deadline_factor(days_overdue: i64) -> f64 {
    let d = days_overdue.clamp(-DEADLINE_FUTURE_DAYS, DEADLINE_OVERDUE_DAYS) as f64;
    let span = (DEADLINE_FUTURE_DAYS + DEADLINE_OVERDUE_DAYS) as f64;
    (d + DEADLINE_FUTURE_DAYS as f64) * 0.8 / span + 0.2
}

/// 1.0 for regular notes; for daily notes, the note's age as a fraction of a year.
fn age_factor(task: &Task, today: NaiveDate) -> f64 {
    if !task.is_daily_note {
        return 1.0;
    }
    match task.daily_note_date {
        Some(date) => (days_between(date, today) as f64 / DAYS_PER_YEAR).clamp(0.0, 1.0),
        None => 1.0,
    }
}

pub fn tag_factor(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1 => 0.8,
        2 => 0.9,
        _ => 1.0,
    }
}
