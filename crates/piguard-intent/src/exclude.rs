//! Package exclusion filter.
//!
//! Framework and well-known library classes are skipped wholesale: their
//! PendingIntent usage is not the app author's code, and phantom classes
//! have no bodies to analyze anyway.

use piguard_ir::Class;

pub struct ExcludeFilter {
    prefixes: Vec<String>,
}

impl ExcludeFilter {
    /// Build a filter from configured patterns. A trailing `*` is only a
    /// wildcard marker; matching is plain prefix comparison.
    pub fn new(patterns: &[String]) -> Self {
        let prefixes = patterns
            .iter()
            .map(|p| p.trim_end_matches('*').to_string())
            .collect();
        Self { prefixes }
    }

    pub fn is_excluded(&self, class: &Class) -> bool {
        if !class.resolvable {
            return true;
        }
        self.prefixes.iter().any(|p| class.name.starts_with(p))
    }
}
