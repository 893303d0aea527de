//! Configuration loading from piguard.toml.
//!
//! Every signature table is overridable; an unset section keeps the
//! compiled-in defaults, so a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use piguard_intent::options::{
    default_exclude_packages, default_pin_signatures, default_raw_init_signatures, default_sinks,
    FLAG_IMMUTABLE,
};
use piguard_intent::{IntentOptions, SinkSpec};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub piguard: PiguardConfig,
    pub exclude: ExcludeConfig,
    pub intent: IntentConfig,
    pub sinks: Vec<SinkSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PiguardConfig {
    /// External decoder invoked as `<bridge_command> --apk <APK>
    /// --android-jar <JAR>`, expected to print the IR JSON on stdout.
    pub bridge_command: String,
    /// Default android.jar path; `--android-jar` on the command line
    /// overrides it.
    pub android_jar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExcludeConfig {
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    #[serde(rename = "type")]
    pub intent_type: String,
    pub immutable_mask: i64,
    pub pin_signatures: Vec<String>,
    pub raw_init_signatures: Vec<String>,
}

impl Default for PiguardConfig {
    fn default() -> Self {
        Self {
            bridge_command: "dex2ir".to_string(),
            android_jar: None,
        }
    }
}

impl Default for ExcludeConfig {
    fn default() -> Self {
        Self {
            packages: default_exclude_packages(),
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            intent_type: "android.content.Intent".to_string(),
            immutable_mask: FLAG_IMMUTABLE,
            pin_signatures: default_pin_signatures(),
            raw_init_signatures: default_raw_init_signatures(),
        }
    }
}

impl Config {
    /// Bridge the file-level config into the analysis options. An empty
    /// `[[sinks]]` list means the built-in factory table.
    pub fn to_options(&self) -> IntentOptions {
        IntentOptions {
            intent_type: self.intent.intent_type.clone(),
            pin_signatures: self.intent.pin_signatures.clone(),
            raw_init_signatures: self.intent.raw_init_signatures.clone(),
            sinks: if self.sinks.is_empty() {
                default_sinks()
            } else {
                self.sinks.clone()
            },
            immutable_mask: self.intent.immutable_mask,
            exclude_packages: self.exclude.packages.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Find and load piguard.toml, walking up from `start_dir`. No file at
/// all means the defaults; a file that exists but cannot be read or
/// parsed is an error, never a silent fallback.
pub fn load_config(start_dir: &Path) -> Result<Config, ConfigError> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                source: e,
            })
        }
        None => Ok(Config::default()),
    }
}

fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("piguard.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Default TOML content for `piguard init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"[piguard]
bridge_command = "dex2ir"
# android_jar = "/opt/android-sdk/platforms/android-34/android.jar"

[exclude]
# Package prefixes that are never analyzed. A trailing * is a wildcard
# marker; matching is by prefix. Unset = the built-in framework and
# library list (android.*, androidx.*, okhttp3.*, ...).
# packages = ["android.*", "androidx.*"]

[intent]
# type = "android.content.Intent"
# immutable_mask = 268435456  # PendingIntent.FLAG_IMMUTABLE
# pin_signatures = [...]      # calls that give an Intent an explicit target
# raw_init_signatures = [...] # constructors producing an untargeted Intent

# PendingIntent factory overloads to check. Unset = all five framework
# overloads (getService, getForegroundService, getActivity x2,
# getActivityAsUser).
# [[sinks]]
# signature = "<android.app.PendingIntent: android.app.PendingIntent getActivity(android.content.Context,int,android.content.Intent,int)>"
# intent_index = 2
# flags_index = 3
"#;
