//! Forward dataflow analysis over one method body.
//!
//! Tracks a [`Fact`] per local through the instruction-level CFG until a
//! fixed point. The merge at join points is key-wise last-writer-wins
//! with predecessors folded in ascending instruction-id order: not a
//! conservative meet, but deterministic, and unresolved conflicts still
//! surface as unknown downstream.

use std::collections::HashMap;

use piguard_diagnostics::Verdict;
use piguard_ir::{InstrKind, Instruction, Method, UnitGraph, Value};

use crate::fact::Fact;
use crate::options::IntentOptions;

/// Abstract state: locals with a known fact. Absent locals are unknown.
pub type FlowState = HashMap<String, Fact>;

/// A `return x` statement returning a local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRecord {
    pub local: String,
    pub instr_id: u32,
}

/// Converged analysis over one method body.
pub struct IntentFlow<'a> {
    graph: UnitGraph<'a>,
    entry_facts: FlowState,
    out_states: HashMap<u32, FlowState>,
    returns: Vec<ReturnRecord>,
}

impl<'a> IntentFlow<'a> {
    /// Run the analysis to a fixed point. Returns `None` for bodiless
    /// methods; those contribute nothing to any verdict.
    pub fn run(method: &'a Method, options: &IntentOptions) -> Option<Self> {
        let body = method.body.as_ref()?;
        let graph = UnitGraph::from_body(body);

        let entry_facts: FlowState = method
            .param_locals
            .iter()
            .enumerate()
            .map(|(i, local)| (local.clone(), Fact::Param(i)))
            .collect();

        // Return records come from a single structural pass, not from
        // the fixed-point iteration.
        let returns: Vec<ReturnRecord> = body
            .instructions
            .iter()
            .filter(|i| i.kind == InstrKind::Return)
            .filter_map(|i| {
                let local = i.operand.as_ref()?.as_local()?;
                Some(ReturnRecord {
                    local: local.to_string(),
                    instr_id: i.id,
                })
            })
            .collect();

        let mut flow = Self {
            graph,
            entry_facts,
            out_states: HashMap::new(),
            returns,
        };
        flow.iterate(method, options);
        Some(flow)
    }

    /// Fixed-point iteration, capped at 100 full passes.
    fn iterate(&mut self, method: &Method, options: &IntentOptions) {
        let mut changed = true;
        let mut iterations = 0;
        while changed && iterations < 100 {
            changed = false;
            iterations += 1;
            for instr in self.graph.instructions() {
                let mut state = self.in_state(instr.id);
                transfer(&mut state, instr, options);
                if self.out_states.get(&instr.id) != Some(&state) {
                    self.out_states.insert(instr.id, state);
                    changed = true;
                }
            }
        }
        if changed {
            tracing::warn!(
                method = %method.signature,
                "dataflow did not converge after 100 iterations"
            );
        }
    }

    /// State flowing into an instruction: entry facts at the entry
    /// instruction, then predecessor out-states folded in ascending
    /// id order, last writer winning per key.
    fn in_state(&self, id: u32) -> FlowState {
        let mut state = FlowState::new();
        if self.graph.entry().is_some_and(|e| e.id == id) {
            state.extend(self.entry_facts.clone());
        }
        for &pred in self.graph.predecessors(id) {
            if let Some(out) = self.out_states.get(&pred) {
                for (local, fact) in out {
                    state.insert(local.clone(), fact.clone());
                }
            }
        }
        state
    }

    /// The converged fact for `local` just before instruction `id`.
    pub fn fact_before(&self, local: &str, id: u32) -> Option<Fact> {
        self.in_state(id).get(local).cloned()
    }

    pub fn returns(&self) -> &[ReturnRecord] {
        &self.returns
    }

    /// Verdict over every return of the method: any unsafe return makes
    /// the method unsafe; the first return with no definite fact makes
    /// it unknown; a method whose returns are all pinned (or that never
    /// returns a local) is safe.
    pub fn verdict(&self) -> Verdict {
        for rec in &self.returns {
            match self.fact_before(&rec.local, rec.instr_id) {
                Some(Fact::Unsafe) => return Verdict::Unsafe,
                Some(Fact::Safe) => {}
                _ => return Verdict::Unknown,
            }
        }
        Verdict::Safe
    }
}

/// Transfer function for one instruction.
///
/// Ordering matters and mirrors the checks' precedence: a pin call wins
/// over anything known before, a raw constructor taints the receiver,
/// and only otherwise does an Intent-returning call record a ReturnOf.
fn transfer(state: &mut FlowState, instr: &Instruction, options: &IntentOptions) {
    let Some(invoke) = &instr.invoke else {
        return;
    };

    if options.pin_signatures.contains(&invoke.signature) {
        if invoke.is_instance() {
            if let Some(Value::Local(receiver)) = &invoke.receiver {
                state.insert(receiver.clone(), Fact::Safe);
            }
        }
    } else if options.raw_init_signatures.contains(&invoke.signature) {
        if invoke.is_instance() {
            if let Some(Value::Local(receiver)) = &invoke.receiver {
                state.insert(receiver.clone(), Fact::Unsafe);
            }
        }
    } else if instr.kind == InstrKind::Assign && invoke.return_type == options.intent_type {
        if let Some(Value::Local(lhs)) = &instr.lhs {
            state.insert(lhs.clone(), Fact::ReturnOf(invoke.signature.clone()));
        }
    }
}
