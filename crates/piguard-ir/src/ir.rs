//! IR types mirroring the JSON schema produced by the dex bridge.
//!
//! The shape follows Soot's Jimple: classes hold methods, a method body is
//! a flat list of three-address instructions plus explicit control-flow
//! edges for jumps. Fall-through edges are implicit and reconstructed by
//! [`crate::cfg::UnitGraph`].

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::IrError;

/// Root type: the complete decompiled application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<Class>,
    #[serde(default)]
    pub apk_path: String,
    #[serde(default)]
    pub bridge_version: String,
}

impl Program {
    /// Parse the JSON program dump emitted by the bridge.
    pub fn from_json(data: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, IrError> {
        let data = std::fs::read_to_string(path).map_err(|e| IrError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&data)
    }

    /// Iterate all methods in class-then-declaration order.
    pub fn methods(&self) -> impl Iterator<Item = (&Class, &Method)> {
        self.classes
            .iter()
            .flat_map(|c| c.methods.iter().map(move |m| (c, m)))
    }

    /// Look up a method by its full signature.
    pub fn find_method(&self, signature: &str) -> Option<&Method> {
        self.methods()
            .map(|(_, m)| m)
            .find(|m| m.signature == signature)
    }

    /// Signature-keyed index for repeated lookups.
    pub fn method_index(&self) -> HashMap<&str, &Method> {
        self.methods()
            .map(|(_, m)| (m.signature.as_str(), m))
            .collect()
    }
}

/// A class from the application dex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    /// False for phantom classes whose bodies could not be loaded.
    #[serde(default = "default_true")]
    pub resolvable: bool,
    #[serde(default)]
    pub methods: Vec<Method>,
}

fn default_true() -> bool {
    true
}

/// A method. `body` is absent for abstract and native methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    /// Full Soot-style signature, e.g.
    /// `<com.example.Foo: android.content.Intent build(int)>`.
    pub signature: String,
    pub short_name: String,
    #[serde(default)]
    pub param_types: Vec<String>,
    /// Local holding each parameter, index-aligned with `param_types`.
    #[serde(default)]
    pub param_locals: Vec<String>,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub instructions: Vec<Instruction>,
    /// Explicit jump edges only; fall-through is implicit.
    #[serde(default)]
    pub cfg_edges: Vec<CfgEdge>,
}

/// One three-address instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: u32,
    pub kind: InstrKind,
    /// Printable Jimple text, used in reports and call-site identity.
    #[serde(default)]
    pub text: String,
    /// Present when the instruction contains an invoke expression, whether
    /// as a bare `Invoke` statement or on the right side of an `Assign`.
    #[serde(default)]
    pub invoke: Option<InvokeExpr>,
    /// Assignment target.
    #[serde(default)]
    pub lhs: Option<Value>,
    /// Returned value for `Return`, assigned value for non-invoke `Assign`.
    #[serde(default)]
    pub operand: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstrKind {
    Assign,
    Invoke,
    Return,
    #[serde(other)]
    Other,
}

/// An invoke expression with its resolved callee signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeExpr {
    pub signature: String,
    pub kind: InvokeKind,
    /// Receiver for instance invokes; absent for static.
    #[serde(default)]
    pub receiver: Option<Value>,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Declared return type of the invoked method.
    #[serde(default)]
    pub return_type: String,
}

impl InvokeExpr {
    /// True for virtual/special dispatch on an instance.
    pub fn is_instance(&self) -> bool {
        matches!(self.kind, InvokeKind::Virtual | InvokeKind::Special)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
    #[serde(other)]
    Unknown,
}

/// An operand. Closed set; the bridge emits `Other` for anything it
/// cannot classify, and those flow to the unknown verdict downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Value {
    Local(String),
    IntConst(i64),
    StringConst(String),
    NullConst,
    Other,
}

impl Value {
    pub fn as_local(&self) -> Option<&str> {
        match self {
            Value::Local(name) => Some(name),
            _ => None,
        }
    }
}

/// Explicit jump edge between instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfgEdge {
    pub from: u32,
    pub to: u32,
    #[serde(default)]
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EdgeKind {
    /// Conditional jump; fall-through to the next instruction also exists.
    #[default]
    Branch,
    /// Unconditional jump; suppresses the fall-through edge.
    Goto,
}
