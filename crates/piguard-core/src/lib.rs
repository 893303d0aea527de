//! Scan orchestration: configuration, the dex bridge, and the glue that
//! turns an APK (or a pre-extracted IR dump) into findings.

pub mod bridge;
pub mod config;
pub mod orchestrator;

pub use bridge::{BridgeError, DexBridge};
pub use config::{load_config, Config, ConfigError, DEFAULT_CONFIG_TOML};
pub use orchestrator::{analyze_apk, analyze_ir_file, analyze_program, OrchestratorError, ScanOutput};
