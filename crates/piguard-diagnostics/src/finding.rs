//! Core finding types.

use serde::{Deserialize, Serialize};

/// One flagged PendingIntent creation site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Full signature of the method containing the call site.
    pub method: String,
    /// Printable text of the PendingIntent creation statement.
    pub call_site: String,
    pub verdict: Verdict,
}

/// Outcome of analyzing one candidate call site.
///
/// `Safe` sites are dropped before reporting; findings only carry
/// `Unsafe` and `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Unsafe,
    Unknown,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Unsafe => write!(f, "unsafe"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Counts over a finished scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub candidates: usize,
    pub unsafe_count: usize,
    pub unknown_count: usize,
    pub analysis_time_ms: u64,
}

impl ScanSummary {
    pub fn from_findings(findings: &[Finding], candidates: usize, analysis_time_ms: u64) -> Self {
        Self {
            candidates,
            unsafe_count: findings
                .iter()
                .filter(|f| f.verdict == Verdict::Unsafe)
                .count(),
            unknown_count: findings
                .iter()
                .filter(|f| f.verdict == Verdict::Unknown)
                .count(),
            analysis_time_ms,
        }
    }

    pub fn total(&self) -> usize {
        self.unsafe_count + self.unknown_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(method: &str, verdict: Verdict) -> Finding {
        Finding {
            method: method.to_string(),
            call_site: "$r3 = staticinvoke <android.app.PendingIntent: ...>".to_string(),
            verdict,
        }
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Unsafe.to_string(), "unsafe");
        assert_eq!(Verdict::Unknown.to_string(), "unknown");
        assert_eq!(Verdict::Safe.to_string(), "safe");
    }

    #[test]
    fn summary_counts() {
        let findings = vec![
            finding("<a.B: void f()>", Verdict::Unsafe),
            finding("<a.B: void g()>", Verdict::Unsafe),
            finding("<a.C: void h()>", Verdict::Unknown),
        ];
        let summary = ScanSummary::from_findings(&findings, 5, 12);
        assert_eq!(summary.unsafe_count, 2);
        assert_eq!(summary.unknown_count, 1);
        assert_eq!(summary.candidates, 5);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn finding_json_roundtrip() {
        let f = finding("<a.B: void f()>", Verdict::Unknown);
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"unknown\""));
        let parsed: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, f);
    }
}
