//! Top-level pass: scan, analyze, classify.

use std::collections::HashSet;

use piguard_diagnostics::{Finding, Verdict};
use piguard_ir::{Program, Value};
use tracing::debug;

use crate::flow::IntentFlow;
use crate::options::IntentOptions;
use crate::resolve::Resolver;
use crate::scanner::{self, CallSite};

/// Findings plus the candidate count the summary reports.
#[derive(Debug)]
pub struct AnalysisRun {
    pub findings: Vec<Finding>,
    pub candidate_count: usize,
}

pub struct IntentAnalyzer;

impl IntentAnalyzer {
    pub fn analyze(program: &Program) -> Vec<Finding> {
        Self::run(program, &IntentOptions::default()).findings
    }

    /// Scan the program, run the flow analysis per candidate, resolve
    /// indirect facts, and keep the unsafe and unknown sites. Identical
    /// (method, statement text) pairs are reported once, first-seen
    /// order preserved.
    pub fn run(program: &Program, options: &IntentOptions) -> AnalysisRun {
        let index = scanner::scan(program, options);
        let resolver = Resolver::new(program, options, &index.corpus);
        let candidate_count = index.candidates.len();

        let mut findings = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for site in &index.candidates {
            let verdict = classify(program, options, &resolver, site);
            debug!(method = %site.method, %verdict, "classified call site");
            if verdict == Verdict::Safe {
                continue;
            }
            if seen.insert((site.method.clone(), site.text.clone())) {
                findings.push(Finding {
                    method: site.method.clone(),
                    call_site: site.text.clone(),
                    verdict,
                });
            }
        }

        AnalysisRun {
            findings,
            candidate_count,
        }
    }
}

/// Verdict for one candidate. Anything the analysis cannot pin down, a
/// non-local Intent argument included, is unknown rather than safe.
fn classify(
    program: &Program,
    options: &IntentOptions,
    resolver: &Resolver<'_>,
    site: &CallSite,
) -> Verdict {
    let Value::Local(local) = &site.intent_arg else {
        return Verdict::Unknown;
    };
    let Some(method) = program.find_method(&site.method) else {
        return Verdict::Unknown;
    };
    let Some(flow) = IntentFlow::run(method, options) else {
        return Verdict::Unknown;
    };
    match flow.fact_before(local, site.instr_id) {
        Some(fact) => {
            let mut visited = HashSet::new();
            resolver.resolve(&fact, &site.method, &mut visited)
        }
        None => Verdict::Unknown,
    }
}
