//! Dex bridge subprocess.
//!
//! Decompiling dex bytecode stays in an external tool; the bridge runs
//! it once per APK and parses the IR JSON it prints on stdout.

use std::path::Path;
use std::process::Command;

use piguard_ir::{IrError, Program};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to spawn dex bridge '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dex bridge exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("invalid bridge output: {0}")]
    InvalidOutput(#[from] IrError),
}

pub struct DexBridge {
    command: String,
}

impl DexBridge {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Run the bridge over one APK and parse its output.
    pub fn extract(&self, apk: &Path, android_jar: &Path) -> Result<Program, BridgeError> {
        info!(command = %self.command, apk = %apk.display(), "running dex bridge");

        let output = Command::new(&self.command)
            .arg("--apk")
            .arg(apk)
            .arg("--android-jar")
            .arg(android_jar)
            .output()
            .map_err(|e| BridgeError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Keep the tail; decoder stack traces can be long.
            let tail: String = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(BridgeError::Failed {
                status: output.status.to_string(),
                stderr: tail,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = stdout.len(), "parsing bridge output");
        Ok(Program::from_json(&stdout)?)
    }
}
