//! Report formatters.
//!
//! The human format mirrors the classic two-bucket listing: every unsafe
//! call site under `unsafe ret:`, every undecidable one under
//! `unknown ret:`, then a one-line summary.

use serde::Serialize;

use crate::finding::{Finding, ScanSummary, Verdict};

pub fn format_human(findings: &[Finding], summary: &ScanSummary) -> String {
    if findings.is_empty() {
        return "No findings\n".to_string();
    }

    let mut out = String::new();

    let unsafe_findings: Vec<_> = findings
        .iter()
        .filter(|f| f.verdict == Verdict::Unsafe)
        .collect();
    let unknown_findings: Vec<_> = findings
        .iter()
        .filter(|f| f.verdict == Verdict::Unknown)
        .collect();

    if !unsafe_findings.is_empty() {
        out.push_str("unsafe ret:\n");
        for f in &unsafe_findings {
            out.push_str(&format!("  {}\n    {}\n", f.method, f.call_site));
        }
    }
    if !unknown_findings.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("unknown ret:\n");
        for f in &unknown_findings {
            out.push_str(&format!("  {}\n    {}\n", f.method, f.call_site));
        }
    }

    out.push_str(&format!(
        "\nFound {} finding(s): {} unsafe, {} unknown ({} candidate site(s) checked)\n",
        summary.total(),
        summary.unsafe_count,
        summary.unknown_count,
        summary.candidates,
    ));

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    findings: &'a [Finding],
    summary: &'a ScanSummary,
}

pub fn format_json(findings: &[Finding], summary: &ScanSummary) -> String {
    let report = JsonReport { findings, summary };
    // Serialization of these plain structs cannot fail.
    serde_json::to_string_pretty(&report).unwrap_or_default()
}
