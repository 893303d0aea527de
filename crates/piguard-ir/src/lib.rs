//! Owned intermediate representation for compiled Android app code.
//!
//! The dex bridge decompiles an APK into a Jimple-like three-address form
//! and emits it as JSON; this crate holds the deserialized types and a
//! per-body control-flow graph view used by the analysis passes.

pub mod cfg;
pub mod ir;

pub use cfg::UnitGraph;
pub use ir::{
    Body, CfgEdge, Class, EdgeKind, Instruction, InstrKind, InvokeExpr, InvokeKind, Method,
    Program, Value,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("failed to parse IR JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read IR file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
