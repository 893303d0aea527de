//! Ties scan, analysis, and reporting together.

use std::path::Path;
use std::time::Instant;

use piguard_diagnostics::{Finding, ScanSummary};
use piguard_intent::IntentAnalyzer;
use piguard_ir::{IrError, Program};
use tracing::info;

use crate::bridge::{BridgeError, DexBridge};
use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Findings plus the summary counts the formatters print.
#[derive(Debug)]
pub struct ScanOutput {
    pub findings: Vec<Finding>,
    pub summary: ScanSummary,
}

/// Full path: decompile the APK through the bridge, then analyze.
pub fn analyze_apk(
    apk: &Path,
    android_jar: &Path,
    config: &Config,
) -> Result<ScanOutput, OrchestratorError> {
    let bridge = DexBridge::new(&config.piguard.bridge_command);
    let program = bridge.extract(apk, android_jar)?;
    Ok(analyze_program(&program, config))
}

/// Analyze a pre-extracted IR dump; used by tests and CI pipelines that
/// cache the bridge output.
pub fn analyze_ir_file(path: &Path, config: &Config) -> Result<ScanOutput, OrchestratorError> {
    let program = Program::from_file(path)?;
    Ok(analyze_program(&program, config))
}

pub fn analyze_program(program: &Program, config: &Config) -> ScanOutput {
    let start = Instant::now();
    let options = config.to_options();
    let run = IntentAnalyzer::run(program, &options);
    let summary = ScanSummary::from_findings(
        &run.findings,
        run.candidate_count,
        start.elapsed().as_millis() as u64,
    );
    info!(
        classes = program.classes.len(),
        candidates = summary.candidates,
        unsafe_count = summary.unsafe_count,
        unknown_count = summary.unknown_count,
        "scan finished"
    );
    ScanOutput {
        findings: run.findings,
        summary,
    }
}
