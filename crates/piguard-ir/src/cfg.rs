//! Instruction-level CFG over a deserialized method body.
//!
//! The bridge only ships explicit jump edges; every non-`Return`
//! instruction without an outgoing `Goto` additionally falls through to
//! the next instruction in body order. Predecessor lists are kept in
//! ascending instruction-id order so dataflow merges are deterministic.

use std::collections::HashMap;

use crate::ir::{Body, EdgeKind, InstrKind, Instruction};

/// A traversable view of one method body.
pub struct UnitGraph<'a> {
    body: &'a Body,
    successors: HashMap<u32, Vec<u32>>,
    predecessors: HashMap<u32, Vec<u32>>,
    instr_map: HashMap<u32, &'a Instruction>,
}

impl<'a> UnitGraph<'a> {
    pub fn from_body(body: &'a Body) -> Self {
        let mut successors: HashMap<u32, Vec<u32>> = HashMap::new();
        let mut predecessors: HashMap<u32, Vec<u32>> = HashMap::new();
        let mut instr_map = HashMap::new();

        for instr in &body.instructions {
            instr_map.insert(instr.id, instr);
            successors.entry(instr.id).or_default();
            predecessors.entry(instr.id).or_default();
        }

        for edge in &body.cfg_edges {
            successors.entry(edge.from).or_default().push(edge.to);
            predecessors.entry(edge.to).or_default().push(edge.from);
        }

        // Implicit fall-through edges.
        for window in body.instructions.windows(2) {
            let (cur, next) = (&window[0], &window[1]);
            if cur.kind == InstrKind::Return {
                continue;
            }
            let has_goto = body
                .cfg_edges
                .iter()
                .any(|e| e.from == cur.id && e.kind == EdgeKind::Goto);
            if has_goto {
                continue;
            }
            successors.entry(cur.id).or_default().push(next.id);
            predecessors.entry(next.id).or_default().push(cur.id);
        }

        for preds in predecessors.values_mut() {
            preds.sort_unstable();
            preds.dedup();
        }
        for succs in successors.values_mut() {
            succs.sort_unstable();
            succs.dedup();
        }

        Self {
            body,
            successors,
            predecessors,
            instr_map,
        }
    }

    /// First instruction in body order.
    pub fn entry(&self) -> Option<&'a Instruction> {
        self.body.instructions.first()
    }

    pub fn instruction(&self, id: u32) -> Option<&'a Instruction> {
        self.instr_map.get(&id).copied()
    }

    pub fn successors(&self, id: u32) -> &[u32] {
        self.successors.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: u32) -> &[u32] {
        self.predecessors
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All instructions in body order.
    pub fn instructions(&self) -> impl Iterator<Item = &'a Instruction> {
        self.body.instructions.iter()
    }

    pub fn instruction_count(&self) -> usize {
        self.body.instructions.len()
    }
}
