//! Finding types and report formatters.
//!
//! The analysis passes produce `Finding` values; the formatters (human
//! listing, JSON) consume them.

pub mod finding;
pub mod report;

pub use finding::{Finding, ScanSummary, Verdict};
pub use report::{format_human, format_json};
