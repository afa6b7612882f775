//! Task extraction from note text.

pub mod context;
pub mod date;
pub mod languages;
pub mod line;
pub mod org;
pub mod patterns;
pub mod planning;
pub mod regex_cache;
pub mod task;

pub use context::{classify_lines, BlockContextTracker, LineContext};
pub use date::parse_date;
pub use line::TaskLineParser;
pub use org::OrgModeTaskParser;
pub use patterns::{build_grammar, grammar_key, Grammar};
pub use planning::{associate_dates, PlanningDates, PlanningStyle};
pub use regex_cache::RegexCache;
pub use task::TaskParser;
