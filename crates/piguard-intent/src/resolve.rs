//! Interprocedural resolution of Param and ReturnOf facts.
//!
//! `ReturnOf` is resolved by running the flow analysis on the callee and
//! judging its returns. `Param` is resolved against the FIRST corpus
//! method, in declaration order, that invokes the callee; other callers
//! are not consulted, so one flagged caller stands for all. Both chase
//! indirect facts recursively; a per-call-site visited set turns any
//! revisited method into unknown instead of recursing forever.

use std::collections::{HashMap, HashSet};

use piguard_diagnostics::Verdict;
use piguard_ir::{Method, Program, Value};
use tracing::trace;

use crate::fact::Fact;
use crate::flow::IntentFlow;
use crate::options::IntentOptions;

pub struct Resolver<'a> {
    options: &'a IntentOptions,
    methods: HashMap<&'a str, &'a Method>,
    corpus: Vec<&'a Method>,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a Program, options: &'a IntentOptions, corpus: &[String]) -> Self {
        let methods = program.method_index();
        let corpus = corpus
            .iter()
            .filter_map(|sig| methods.get(sig.as_str()).copied())
            .collect();
        Self {
            options,
            methods,
            corpus,
        }
    }

    /// Resolve a fact observed inside `containing` to a final verdict.
    /// `visited` is shared across the whole chase for one call site.
    pub fn resolve(&self, fact: &Fact, containing: &str, visited: &mut HashSet<String>) -> Verdict {
        match fact {
            Fact::Safe => Verdict::Safe,
            Fact::Unsafe => Verdict::Unsafe,
            Fact::ReturnOf(callee) => self.resolve_return_of(callee, visited),
            Fact::Param(index) => self.resolve_param(containing, *index, visited),
        }
    }

    /// Verdict for the Intent returned by `callee`.
    fn resolve_return_of(&self, callee: &str, visited: &mut HashSet<String>) -> Verdict {
        if !visited.insert(format!("ret:{callee}")) {
            trace!(callee, "recursive return chain, giving up");
            return Verdict::Unknown;
        }
        let Some(method) = self.methods.get(callee).copied() else {
            return Verdict::Unknown;
        };
        let Some(flow) = IntentFlow::run(method, self.options) else {
            return Verdict::Unknown;
        };

        for rec in flow.returns() {
            match flow.fact_before(&rec.local, rec.instr_id) {
                Some(Fact::Unsafe) => return Verdict::Unsafe,
                Some(Fact::Safe) => {}
                Some(fact) => match self.resolve(&fact, callee, visited) {
                    Verdict::Safe => {}
                    other => return other,
                },
                None => return Verdict::Unknown,
            }
        }
        Verdict::Safe
    }

    /// Verdict for the `index`-th argument passed to `callee`, judged at
    /// the first invoking call site found in the corpus.
    fn resolve_param(&self, callee: &str, index: usize, visited: &mut HashSet<String>) -> Verdict {
        if !visited.insert(format!("param:{callee}#{index}")) {
            trace!(callee, index, "recursive parameter chain, giving up");
            return Verdict::Unknown;
        }

        for caller in &self.corpus {
            let Some(body) = &caller.body else {
                continue;
            };
            for instr in &body.instructions {
                let Some(invoke) = &instr.invoke else {
                    continue;
                };
                if invoke.signature != callee {
                    continue;
                }
                return match invoke.args.get(index) {
                    Some(Value::Local(local)) => {
                        match IntentFlow::run(caller, self.options)
                            .and_then(|flow| flow.fact_before(local, instr.id))
                        {
                            Some(fact) => self.resolve(&fact, &caller.signature, visited),
                            None => Verdict::Unknown,
                        }
                    }
                    _ => Verdict::Unknown,
                };
            }
        }
        Verdict::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piguard_ir::{Body, Class, InstrKind, Instruction, InvokeExpr, InvokeKind};

    const INTENT: &str = "android.content.Intent";
    const RAW_INIT: &str = "<android.content.Intent: void <init>()>";
    const SET_PACKAGE: &str =
        "<android.content.Intent: android.content.Intent setPackage(java.lang.String)>";

    fn virtual_invoke(id: u32, sig: &str, receiver: &str) -> Instruction {
        Instruction {
            id,
            kind: InstrKind::Invoke,
            text: format!("i{id}"),
            invoke: Some(InvokeExpr {
                signature: sig.to_string(),
                kind: InvokeKind::Virtual,
                receiver: Some(Value::Local(receiver.to_string())),
                args: vec![],
                return_type: "void".to_string(),
            }),
            lhs: None,
            operand: None,
        }
    }

    fn call_with_arg(id: u32, sig: &str, arg: Value) -> Instruction {
        Instruction {
            id,
            kind: InstrKind::Invoke,
            text: format!("i{id}"),
            invoke: Some(InvokeExpr {
                signature: sig.to_string(),
                kind: InvokeKind::Static,
                receiver: None,
                args: vec![arg],
                return_type: "void".to_string(),
            }),
            lhs: None,
            operand: None,
        }
    }

    fn assign_call(id: u32, sig: &str, lhs: &str) -> Instruction {
        Instruction {
            id,
            kind: InstrKind::Assign,
            text: format!("{lhs} = staticinvoke {sig}"),
            invoke: Some(InvokeExpr {
                signature: sig.to_string(),
                kind: InvokeKind::Static,
                receiver: None,
                args: vec![],
                return_type: INTENT.to_string(),
            }),
            lhs: Some(Value::Local(lhs.to_string())),
            operand: None,
        }
    }

    fn return_local(id: u32, local: &str) -> Instruction {
        Instruction {
            id,
            kind: InstrKind::Return,
            text: format!("return {local}"),
            invoke: None,
            lhs: None,
            operand: Some(Value::Local(local.to_string())),
        }
    }

    fn method(sig: &str, instructions: Vec<Instruction>) -> Method {
        Method {
            signature: sig.to_string(),
            short_name: "m".to_string(),
            param_types: vec![],
            param_locals: vec![],
            return_type: INTENT.to_string(),
            body: Some(Body {
                instructions,
                cfg_edges: vec![],
            }),
        }
    }

    fn program(methods: Vec<Method>) -> Program {
        Program {
            classes: vec![Class {
                name: "com.example.T".to_string(),
                resolvable: true,
                methods,
            }],
            apk_path: String::new(),
            bridge_version: String::new(),
        }
    }

    fn corpus_of(program: &Program) -> Vec<String> {
        program
            .methods()
            .map(|(_, m)| m.signature.clone())
            .collect()
    }

    #[test]
    fn return_of_pinned_builder_is_safe() {
        let builder_sig = "<com.example.T: android.content.Intent build()>";
        let prog = program(vec![method(
            builder_sig,
            vec![
                virtual_invoke(0, RAW_INIT, "$r1"),
                virtual_invoke(1, SET_PACKAGE, "$r1"),
                return_local(2, "$r1"),
            ],
        )]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(
                &Fact::ReturnOf(builder_sig.to_string()),
                "<caller>",
                &mut visited
            ),
            Verdict::Safe
        );
    }

    #[test]
    fn return_of_chained_builders_follows_the_chain() {
        // outer() returns inner(); inner() returns a raw Intent.
        let outer_sig = "<com.example.T: android.content.Intent outer()>";
        let inner_sig = "<com.example.T: android.content.Intent inner()>";
        let prog = program(vec![
            method(
                outer_sig,
                vec![assign_call(0, inner_sig, "$r2"), return_local(1, "$r2")],
            ),
            method(
                inner_sig,
                vec![virtual_invoke(0, RAW_INIT, "$r1"), return_local(1, "$r1")],
            ),
        ]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(
                &Fact::ReturnOf(outer_sig.to_string()),
                "<caller>",
                &mut visited
            ),
            Verdict::Unsafe
        );
    }

    #[test]
    fn return_of_unknown_method_is_unknown() {
        let prog = program(vec![]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &[]);
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(
                &Fact::ReturnOf("<com.example.Gone: android.content.Intent f()>".to_string()),
                "<caller>",
                &mut visited
            ),
            Verdict::Unknown
        );
    }

    #[test]
    fn param_resolves_through_first_caller() {
        // fire(intent) receives its Intent from go(), which raw-inits it.
        let fire_sig = "<com.example.T: void fire(android.content.Intent)>";
        let go_sig = "<com.example.T: void go()>";

        let mut fire = method(fire_sig, vec![]);
        fire.param_types = vec![INTENT.to_string()];
        fire.param_locals = vec!["r1".to_string()];
        fire.return_type = "void".to_string();

        let go = method(
            go_sig,
            vec![
                virtual_invoke(0, RAW_INIT, "$r1"),
                call_with_arg(1, fire_sig, Value::Local("$r1".to_string())),
            ],
        );

        let prog = program(vec![fire, go]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(&Fact::Param(0), fire_sig, &mut visited),
            Verdict::Unsafe
        );
    }

    #[test]
    fn only_the_first_caller_counts() {
        // Declaration order: bad caller first, good caller second.
        let fire_sig = "<com.example.T: void fire(android.content.Intent)>";
        let bad_sig = "<com.example.T: void bad()>";
        let good_sig = "<com.example.T: void good()>";

        let mut fire = method(fire_sig, vec![]);
        fire.param_types = vec![INTENT.to_string()];
        fire.param_locals = vec!["r1".to_string()];

        let bad = method(
            bad_sig,
            vec![
                virtual_invoke(0, RAW_INIT, "$r1"),
                call_with_arg(1, fire_sig, Value::Local("$r1".to_string())),
            ],
        );
        let good = method(
            good_sig,
            vec![
                virtual_invoke(0, RAW_INIT, "$r1"),
                virtual_invoke(1, SET_PACKAGE, "$r1"),
                call_with_arg(2, fire_sig, Value::Local("$r1".to_string())),
            ],
        );

        let prog = program(vec![fire, bad, good]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(&Fact::Param(0), fire_sig, &mut visited),
            Verdict::Unsafe
        );
    }

    #[test]
    fn param_with_no_caller_is_unknown() {
        let fire_sig = "<com.example.T: void fire(android.content.Intent)>";
        let mut fire = method(fire_sig, vec![]);
        fire.param_types = vec![INTENT.to_string()];
        fire.param_locals = vec!["r1".to_string()];

        let prog = program(vec![fire]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(&Fact::Param(0), fire_sig, &mut visited),
            Verdict::Unknown
        );
    }

    #[test]
    fn null_argument_at_caller_is_unknown() {
        let fire_sig = "<com.example.T: void fire(android.content.Intent)>";
        let go_sig = "<com.example.T: void go()>";

        let mut fire = method(fire_sig, vec![]);
        fire.param_types = vec![INTENT.to_string()];
        fire.param_locals = vec!["r1".to_string()];

        let go = method(go_sig, vec![call_with_arg(0, fire_sig, Value::NullConst)]);

        let prog = program(vec![fire, go]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(&Fact::Param(0), fire_sig, &mut visited),
            Verdict::Unknown
        );
    }

    #[test]
    fn self_recursive_return_chain_is_unknown() {
        let rec_sig = "<com.example.T: android.content.Intent rec()>";
        let prog = program(vec![method(
            rec_sig,
            vec![assign_call(0, rec_sig, "$r1"), return_local(1, "$r1")],
        )]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(
                &Fact::ReturnOf(rec_sig.to_string()),
                "<caller>",
                &mut visited
            ),
            Verdict::Unknown
        );
    }

    #[test]
    fn mutually_recursive_return_chain_is_unknown() {
        let a_sig = "<com.example.T: android.content.Intent a()>";
        let b_sig = "<com.example.T: android.content.Intent b()>";
        let prog = program(vec![
            method(
                a_sig,
                vec![assign_call(0, b_sig, "$r1"), return_local(1, "$r1")],
            ),
            method(
                b_sig,
                vec![assign_call(0, a_sig, "$r1"), return_local(1, "$r1")],
            ),
        ]);
        let options = IntentOptions::default();
        let resolver = Resolver::new(&prog, &options, &corpus_of(&prog));
        let mut visited = HashSet::new();
        assert_eq!(
            resolver.resolve(&Fact::ReturnOf(a_sig.to_string()), "<caller>", &mut visited),
            Verdict::Unknown
        );
    }
}
