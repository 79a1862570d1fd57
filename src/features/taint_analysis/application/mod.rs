//! Application layer (C8): the per-procedure checker driver (§4.7).
//!
//! This is the only place in the crate that owns all five ports at once:
//! it builds the initial state, drives the caller-supplied fixpoint
//! engine, and — on success — compresses the result into a summary via
//! C7 and persists it.

use crate::errors::{CodegraphError, Result};
use crate::features::taint_analysis::domain::{AccessPath, AccessTree, Node, ProcedureId, Trace};
use crate::features::taint_analysis::infrastructure::{
    build_summary, GuardedSummaryStore, StandardTransferFunction,
};
use crate::features::taint_analysis::ports::{
    FixpointEngine, FixpointOutcome, IssueReporter, ProgramModel, SummaryStore, TaintSpecification,
};

/// Hook run before the fixpoint engine starts (§4.7 step 1). Most
/// analyses have nothing to do here; it exists so a host application can
/// warm a cache or validate preconditions without threading an extra
/// parameter through `checker` itself.
pub trait PreAnalysis {
    fn ensure_ready(&self, proc: &ProcedureId) {
        let _ = proc;
    }
}

/// The default no-op hook.
pub struct NoPreAnalysis;

impl PreAnalysis for NoPreAnalysis {}

/// Drive one procedure to a fixpoint and persist its summary (§4.7).
///
/// Seeds the initial state from `spec.tainted_formals`, runs `engine`
/// under a self-reentrancy guard on `store` (§5 invariant 4), and on
/// `Post` compresses the result via [`build_summary`] (C7) before
/// writing it back. `Err` only for the fail-fast conditions of §7: a
/// summary-application mismatch surfaced through `engine.run`, or a
/// `NoPost` outcome on a procedure whose CFG is not legitimately empty.
pub fn checker<T: Trace>(
    proc: &ProcedureId,
    program: &dyn ProgramModel,
    spec: &dyn TaintSpecification<T>,
    store: &dyn SummaryStore<T>,
    reporter: &dyn IssueReporter<T>,
    engine: &dyn FixpointEngine<T>,
    pre_analysis: &dyn PreAnalysis,
    managed_language: bool,
) -> Result<Option<AccessTree<T>>> {
    pre_analysis.ensure_ready(proc);

    let formals = program.formals(proc);
    let mut initial: AccessTree<T> = AccessTree::empty();
    for (formal_index, source) in spec.tainted_formals(proc) {
        if let Some(base) = formals.get(formal_index) {
            initial.add_node(
                &AccessPath::exact(base.clone(), vec![]),
                Node::leaf(T::of_source(source)),
            );
        }
    }

    let guarded = GuardedSummaryStore::new(store, proc.clone());
    let transfer = StandardTransferFunction::new(proc.clone(), program, spec, &guarded, reporter);

    match engine.run(proc, initial, &transfer)? {
        FixpointOutcome::Post(post) => {
            let summary = build_summary(&post, program, spec, proc, managed_language);
            store.write_summary(proc, summary.clone());
            Ok(Some(summary))
        }
        FixpointOutcome::NoPost => {
            if program.start_node_has_successors(proc) {
                Err(CodegraphError::no_post_non_empty_cfg(proc.to_string()))
            } else {
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::taint_analysis::domain::{
        AccessStep, CallSite, FootprintAware, ProgramVar, ReportablePath, TypeTag, VariableBase,
    };
    use crate::features::taint_analysis::ports::{
        Instruction, PropagationRule, RhsExpr, SinkDecl, SourceDecl, TransferFunction,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestSource {
        tag: &'static str,
    }

    impl FootprintAware for TestSource {
        fn get_footprint_access_path(&self) -> Option<AccessPath> {
            None
        }
    }

    #[derive(Debug, Clone, Default)]
    struct TestTrace {
        sources: Vec<TestSource>,
        has_sink: bool,
    }

    impl Trace for TestTrace {
        type Source = TestSource;
        type Sink = ();

        fn empty() -> Self {
            Self::default()
        }

        fn of_source(src: Self::Source) -> Self {
            Self {
                sources: vec![src],
                has_sink: false,
            }
        }

        fn add_source(&self, src: Self::Source) -> Self {
            let mut sources = self.sources.clone();
            sources.push(src);
            Self {
                sources,
                has_sink: self.has_sink,
            }
        }

        fn add_sink(&self, _sink: Self::Sink) -> Self {
            Self {
                sources: self.sources.clone(),
                has_sink: true,
            }
        }

        fn sources(&self) -> Vec<Self::Source> {
            self.sources.clone()
        }

        fn sinks(&self) -> Vec<Self::Sink> {
            if self.has_sink {
                vec![()]
            } else {
                vec![]
            }
        }

        fn is_empty(&self) -> bool {
            self.sources.is_empty() && !self.has_sink
        }

        fn join(&self, other: &Self) -> Self {
            let mut sources = self.sources.clone();
            sources.extend(other.sources.clone());
            Self {
                sources,
                has_sink: self.has_sink || other.has_sink,
            }
        }

        fn append(caller: &Self, callee: &Self, _call_site: &CallSite) -> Self {
            caller.join(callee)
        }

        fn update_sources(&self, new_sources: Vec<Self::Source>) -> Self {
            Self {
                sources: new_sources,
                has_sink: self.has_sink,
            }
        }

        fn get_reportable_paths(
            &self,
            is_endpoint: &dyn Fn(&Self::Source) -> bool,
        ) -> Vec<ReportablePath<Self::Source, Self::Sink>> {
            if !self.has_sink {
                return vec![];
            }
            self.sources
                .iter()
                .map(|s| ReportablePath {
                    source: s.clone(),
                    sink: (),
                    is_endpoint: is_endpoint(s),
                })
                .collect()
        }

        fn to_loc_trace(&self) -> Vec<crate::shared::models::Span> {
            Vec::new()
        }

        fn pp(&self) -> String {
            format!("{} sources, sink={}", self.sources.len(), self.has_sink)
        }
    }

    struct FakeProgram {
        has_successors: bool,
    }

    impl ProgramModel for FakeProgram {
        fn formal_index(&self, _proc: &ProcedureId, base: &VariableBase) -> Option<usize> {
            match base {
                VariableBase::Program(v) if v.name == "a" => Some(0),
                _ => None,
            }
        }

        fn formals(&self, _proc: &ProcedureId) -> Vec<VariableBase> {
            vec![VariableBase::Program(ProgramVar::new("a"))]
        }

        fn return_type(&self, _proc: &ProcedureId) -> TypeTag {
            TypeTag::Scalar
        }

        fn type_of(&self, _proc: &ProcedureId, _path: &AccessPath) -> TypeTag {
            TypeTag::Scalar
        }

        fn last_param_is_variadic_array(&self, _callee: &ProcedureId) -> bool {
            false
        }

        fn start_node_has_successors(&self, _proc: &ProcedureId) -> bool {
            self.has_successors
        }
    }

    struct FakeSpec;

    impl TaintSpecification<TestTrace> for FakeSpec {
        fn source_at(
            &self,
            _caller: &ProcedureId,
            _callee: &ProcedureId,
            _loc: &crate::shared::models::Span,
        ) -> Option<SourceDecl<TestTrace>> {
            None
        }

        fn sinks_at(
            &self,
            _caller: &ProcedureId,
            _callee: &ProcedureId,
            _loc: &crate::shared::models::Span,
        ) -> Vec<SinkDecl<TestTrace>> {
            Vec::new()
        }

        fn tainted_formals(&self, _proc: &ProcedureId) -> Vec<(usize, TestSource)> {
            vec![(0, TestSource { tag: "formal-a" })]
        }

        fn propagation_rules(&self, _callee: &ProcedureId) -> Vec<PropagationRule> {
            Vec::new()
        }

        fn is_taintable_type(&self, _ty: &TypeTag) -> bool {
            true
        }

        fn make_footprint(&self, path: AccessPath, _proc: &ProcedureId) -> TestSource {
            let _ = path;
            TestSource { tag: "footprint" }
        }
    }

    struct NullReporter;

    impl IssueReporter<TestTrace> for NullReporter {
        fn report(&self, _call_site: &CallSite, _path: &ReportablePath<TestSource, ()>) {}
    }

    struct StraightLineEngine {
        instructions: Vec<Instruction>,
    }

    impl FixpointEngine<TestTrace> for StraightLineEngine {
        fn run(
            &self,
            _proc: &ProcedureId,
            initial: AccessTree<TestTrace>,
            transfer: &dyn TransferFunction<TestTrace>,
        ) -> Result<FixpointOutcome<TestTrace>> {
            let mut state = initial;
            for instr in &self.instructions {
                state = transfer.step(&state, instr)?;
            }
            Ok(FixpointOutcome::Post(state))
        }
    }

    struct NoPostEngine;

    impl FixpointEngine<TestTrace> for NoPostEngine {
        fn run(
            &self,
            _proc: &ProcedureId,
            _initial: AccessTree<TestTrace>,
            _transfer: &dyn TransferFunction<TestTrace>,
        ) -> Result<FixpointOutcome<TestTrace>> {
            Ok(FixpointOutcome::NoPost)
        }
    }

    fn proc(name: &str) -> ProcedureId {
        ProcedureId::new(name)
    }

    #[test]
    fn checker_seeds_tainted_formal_and_returns_summary() {
        let program = FakeProgram {
            has_successors: true,
        };
        let spec = FakeSpec;
        let store = crate::features::taint_analysis::infrastructure::InMemorySummaryStore::new(4);
        let reporter = NullReporter;
        let p = proc("current");

        let a_base = VariableBase::Program(ProgramVar::new("a"));
        let b_base = VariableBase::Program(ProgramVar::new("b"));
        let engine = StraightLineEngine {
            instructions: vec![Instruction::Assign {
                lhs: AccessPath::exact(b_base.clone(), vec![AccessStep::Field("f".into())]),
                rhs: RhsExpr::Path(AccessPath::exact(a_base.clone(), vec![])),
            }],
        };

        let result = checker(
            &p,
            &program,
            &spec,
            &store,
            &reporter,
            &engine,
            &NoPreAnalysis,
            false,
        )
        .expect("checker should succeed");

        let summary = result.expect("procedure with successors produces a summary");
        assert!(!summary.is_empty());
    }

    #[test]
    fn checker_returns_none_when_no_post_and_no_successors() {
        let program = FakeProgram {
            has_successors: false,
        };
        let spec = FakeSpec;
        let store = crate::features::taint_analysis::infrastructure::InMemorySummaryStore::new(4);
        let reporter = NullReporter;
        let engine = NoPostEngine;

        let result = checker(
            &proc("empty"),
            &program,
            &spec,
            &store,
            &reporter,
            &engine,
            &NoPreAnalysis,
            false,
        )
        .expect("legitimately-empty CFG is not an error");

        assert!(result.is_none());
    }

    #[test]
    fn checker_fails_fast_when_no_post_but_cfg_has_successors() {
        let program = FakeProgram {
            has_successors: true,
        };
        let spec = FakeSpec;
        let store = crate::features::taint_analysis::infrastructure::InMemorySummaryStore::new(4);
        let reporter = NullReporter;
        let engine = NoPostEngine;

        let result = checker(
            &proc("broken"),
            &program,
            &spec,
            &store,
            &reporter,
            &engine,
            &NoPreAnalysis,
            false,
        );

        assert!(matches!(result, Err(CodegraphError::NoPostNonEmptyCfg(_))));
    }
}
