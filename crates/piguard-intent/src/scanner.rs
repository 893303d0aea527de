//! Candidate collection pass.
//!
//! Walks every non-excluded class once, in declaration order, and
//! records (a) the corpus of methods that reference the Intent type at
//! all, and (b) every PendingIntent factory call that survives the two
//! cheap short-circuits: a constant flags word with FLAG_IMMUTABLE set,
//! and a literal null Intent argument.

use piguard_ir::{Method, Program, Value};
use tracing::debug;

use crate::exclude::ExcludeFilter;
use crate::options::{IntentOptions, SinkSpec};

/// One PendingIntent factory call to classify.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Signature of the containing method.
    pub method: String,
    pub instr_id: u32,
    /// Printable statement text; part of the call-site identity.
    pub text: String,
    /// The argument at the sink's intent position.
    pub intent_arg: Value,
}

/// Output of the scan pass. Both lists keep declaration order so the
/// whole run is deterministic.
#[derive(Debug, Default)]
pub struct ScanIndex {
    pub candidates: Vec<CallSite>,
    /// Signatures of methods that reference the Intent type; the caller
    /// search during Param resolution is restricted to these.
    pub corpus: Vec<String>,
}

pub fn scan(program: &Program, options: &IntentOptions) -> ScanIndex {
    let filter = ExcludeFilter::new(&options.exclude_packages);
    let mut index = ScanIndex::default();

    for class in &program.classes {
        if filter.is_excluded(class) {
            debug!(class = %class.name, "skipping excluded class");
            continue;
        }
        for method in &class.methods {
            if references_intent(method, &options.intent_type) {
                index.corpus.push(method.signature.clone());
            }
            collect_candidates(method, options, &mut index.candidates);
        }
    }

    index
}

/// Structural check for whether a method touches the Intent type at
/// all, through its signature or any statement in its body.
fn references_intent(method: &Method, intent_type: &str) -> bool {
    if method.return_type == intent_type
        || method.param_types.iter().any(|t| t == intent_type)
    {
        return true;
    }
    let Some(body) = &method.body else {
        return false;
    };
    body.instructions.iter().any(|i| {
        i.text.contains(intent_type)
            || i.invoke
                .as_ref()
                .is_some_and(|inv| inv.signature.contains(intent_type))
    })
}

fn collect_candidates(method: &Method, options: &IntentOptions, out: &mut Vec<CallSite>) {
    let Some(body) = &method.body else {
        return;
    };
    for instr in &body.instructions {
        let Some(invoke) = &instr.invoke else {
            continue;
        };
        let Some(sink) = find_sink(&invoke.signature, &options.sinks) else {
            continue;
        };

        // A constant flags word with every immutability-mask bit set is
        // safe regardless of the Intent. A partial overlap is not.
        if let Some(Value::IntConst(flags)) = invoke.args.get(sink.flags_index) {
            if flags & options.immutable_mask == options.immutable_mask {
                continue;
            }
        }

        let intent_arg = invoke.args.get(sink.intent_index).cloned();
        // A literal null wraps no Intent at all.
        if matches!(intent_arg, Some(Value::NullConst)) {
            continue;
        }

        out.push(CallSite {
            method: method.signature.clone(),
            instr_id: instr.id,
            text: instr.text.clone(),
            intent_arg: intent_arg.unwrap_or(Value::Other),
        });
    }
}

fn find_sink<'a>(signature: &str, sinks: &'a [SinkSpec]) -> Option<&'a SinkSpec> {
    sinks.iter().find(|s| s.signature == signature)
}
