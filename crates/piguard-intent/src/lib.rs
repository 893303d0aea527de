//! Analysis of PendingIntent creation around implicit Intents.
//!
//! A PendingIntent built over an Intent with no explicit target and
//! without FLAG_IMMUTABLE can be retargeted by the app that receives it.
//! This crate scans every PendingIntent factory call in a program,
//! tracks what is known about the wrapped Intent with a forward dataflow
//! analysis, and classifies each call site as safe, unsafe, or unknown.

pub mod analysis;
pub mod exclude;
pub mod fact;
pub mod flow;
pub mod options;
pub mod resolve;
pub mod scanner;

pub use analysis::{AnalysisRun, IntentAnalyzer};
pub use fact::Fact;
pub use options::{IntentOptions, SinkSpec};
