//! Analysis options: signature tables, the immutability mask, and the
//! package exclusion list.
//!
//! Defaults match the Android framework surface as of API 34. Every
//! table can be overridden from `piguard.toml`.

use serde::{Deserialize, Serialize};

/// PendingIntent FLAG_IMMUTABLE.
pub const FLAG_IMMUTABLE: i64 = 1 << 28;

/// One PendingIntent factory overload with its argument layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    pub signature: String,
    /// Argument position of the wrapped Intent.
    pub intent_index: usize,
    /// Argument position of the flags word.
    pub flags_index: usize,
}

impl SinkSpec {
    pub fn new(signature: impl Into<String>, intent_index: usize, flags_index: usize) -> Self {
        Self {
            signature: signature.into(),
            intent_index,
            flags_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentOptions {
    /// Fully qualified Intent type name.
    pub intent_type: String,
    /// Calls that pin an Intent to an explicit target.
    pub pin_signatures: Vec<String>,
    /// Constructors that produce an untargeted Intent.
    pub raw_init_signatures: Vec<String>,
    pub sinks: Vec<SinkSpec>,
    pub immutable_mask: i64,
    /// Package prefixes never analyzed; a trailing `*` is a wildcard
    /// marker and is stripped before matching.
    pub exclude_packages: Vec<String>,
}

impl Default for IntentOptions {
    fn default() -> Self {
        Self {
            intent_type: "android.content.Intent".to_string(),
            pin_signatures: default_pin_signatures(),
            raw_init_signatures: default_raw_init_signatures(),
            sinks: default_sinks(),
            immutable_mask: FLAG_IMMUTABLE,
            exclude_packages: default_exclude_packages(),
        }
    }
}

pub fn default_pin_signatures() -> Vec<String> {
    [
        "<android.content.Intent: void <init>(android.content.Context,java.lang.Class)>",
        "<android.content.Intent: android.content.Intent setPackage(java.lang.String)>",
        "<android.content.Intent: android.content.Intent setClassName(java.lang.String,java.lang.String)>",
        "<android.content.Intent: android.content.Intent setClassName(android.content.Context,java.lang.String)>",
        "<android.content.Intent: android.content.Intent setComponent(android.content.ComponentName)>",
        "<android.content.Intent: android.content.Intent setClass(android.content.Context,java.lang.Class)>",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_raw_init_signatures() -> Vec<String> {
    [
        "<android.content.Intent: void <init>()>",
        "<android.content.Intent: void <init>(java.lang.String)>",
        "<android.content.Intent: void <init>(java.lang.String,android.net.Uri)>",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_sinks() -> Vec<SinkSpec> {
    vec![
        SinkSpec::new(
            "<android.app.PendingIntent: android.app.PendingIntent getService(android.content.Context,int,android.content.Intent,int)>",
            2,
            3,
        ),
        SinkSpec::new(
            "<android.app.PendingIntent: android.app.PendingIntent getForegroundService(android.content.Context,int,android.content.Intent,int)>",
            2,
            3,
        ),
        SinkSpec::new(
            "<android.app.PendingIntent: android.app.PendingIntent getActivity(android.content.Context,int,android.content.Intent,int)>",
            2,
            3,
        ),
        SinkSpec::new(
            "<android.app.PendingIntent: android.app.PendingIntent getActivity(android.content.Context,int,android.content.Intent,int,android.os.Bundle)>",
            2,
            3,
        ),
        SinkSpec::new(
            "<android.app.PendingIntent: android.app.PendingIntent getActivityAsUser(android.content.Context,int,android.content.Intent,int,android.os.Bundle,android.os.UserHandle)>",
            2,
            3,
        ),
    ]
}

pub fn default_exclude_packages() -> Vec<String> {
    [
        "android.*",
        "androidx.*",
        "soot.*",
        "java.*",
        "javax.*",
        "kotlin.*",
        "kotlinx.*",
        "retrofit.*",
        "retrofit2.*",
        "sun.*",
        "org.*",
        "uk.*",
        "rx.*",
        "dalvik.*",
        "io.*",
        "okio.*",
        "okhttp.*",
        "okhttp3.*",
        "roboguice.util.*",
        "de.greenrobot.*",
        "com.google.android.material.*",
        "com.google.gson.*",
        "com.google.protobuf.*",
        "com.google.firebase.*",
        "com.squareup.*",
        "com.nineoldandroids.*",
        "com.airbnb.lottie.*",
        "com.bumptech.glide.*",
        "com.reactnativecommunity.*",
        "com.facebook.litho.*",
        "com.facebook.react.*",
        "com.facebook.profilo.*",
        "com.horcrux.svg.*",
        "com.handmark.pulltorefresh.*",
        "com.tekartik.sqflite.*",
        "com.swmansion.gesturehandler.*",
        "com.tbruyelle.rxpermissions.*",
        "com.trello.rxlifecycle.*",
        "com.alibaba.fastjson.*",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_factory_overloads() {
        let options = IntentOptions::default();
        assert_eq!(options.sinks.len(), 5);
        assert!(options
            .sinks
            .iter()
            .all(|s| s.intent_index == 2 && s.flags_index == 3));
        assert!(options.sinks[0].signature.contains("getService"));
    }

    #[test]
    fn immutable_mask_is_flag_immutable() {
        assert_eq!(IntentOptions::default().immutable_mask, 0x1000_0000);
    }

    #[test]
    fn pin_and_raw_tables_are_disjoint() {
        let options = IntentOptions::default();
        for sig in &options.raw_init_signatures {
            assert!(!options.pin_signatures.contains(sig));
        }
    }
}
