//! Ports (Hexagonal Architecture) — the external collaborators §1 places
//! out of scope: the program model, the taint specification, the
//! fixpoint engine, and the summary store. The core never owns a
//! concrete implementation of any of these; it is generic over them.
//!
//! ```text
//!                 +---------------------------+
//!                 |     checker(callback)      |  <- application layer (C8)
//!                 +-------------+--------------+
//!                               |
//!         +---------------------+---------------------+
//!         |                     |                      |
//!   ProgramModel      TaintSpecification<Tr>      FixpointEngine<Tr>
//!  (CFG, formals,     (sources, sinks,             (drives the
//!   typing)            propagation rules)           transfer function)
//!         |                     |                      |
//!         +---------------------+---------------------+
//!                               |
//!                        SummaryStore<Tr>   <- read_summary / write_summary
//! ```

use crate::errors::Result;
use crate::features::taint_analysis::domain::{
    AccessPath, AccessTree, ProcedureId, Trace, TypeTag, VariableBase,
};
use crate::shared::models::Span;

// ============================================================================
// HIL instructions (consumed from the HIL-lowering collaborator, §1)
// ============================================================================

/// The right-hand side of an `Assign` instruction. `ExceptionValue` and
/// `NullLiteral` exist so the two `Assign` skip-cases of §4.2 are
/// predicates on this type rather than on frontend-specific heuristics
/// baked into the transfer function (per §9's open-question resolution).
#[derive(Debug, Clone)]
pub enum RhsExpr {
    Path(AccessPath),
    NullLiteral,
    ExceptionValue,
    Other,
}

/// One actual argument at a call site. Only `Path` actuals can carry or
/// receive taint; `Other` represents literals and anything else that is
/// not an access path.
#[derive(Debug, Clone)]
pub enum Actual {
    Path(AccessPath),
    Other,
}

impl Actual {
    pub fn as_path(&self) -> Option<&AccessPath> {
        match self {
            Actual::Path(ap) => Some(ap),
            Actual::Other => None,
        }
    }
}

/// A single HIL instruction (§4.2).
#[derive(Debug, Clone)]
pub enum Instruction {
    Assign {
        lhs: AccessPath,
        rhs: RhsExpr,
    },
    Call {
        ret: Option<AccessPath>,
        callee: ProcedureId,
        /// Virtual-dispatch targets in addition to `callee` itself.
        dynamic_targets: Vec<ProcedureId>,
        actuals: Vec<Actual>,
        managed_language: bool,
        short_method_name: String,
        loc: Span,
    },
}

// ============================================================================
// Program model
// ============================================================================

/// The program representation: procedures, their formals, their typing,
/// and dynamic-dispatch resolution (§6: "Program model: procedures
/// expose name, return type, start node, parameters; access-path typing;
/// dynamic-dispatch target list; variable classification predicates").
pub trait ProgramModel {
    /// `Some(i)` iff `base` is the `i`-th formal parameter of `proc`.
    fn formal_index(&self, proc: &ProcedureId, base: &VariableBase) -> Option<usize>;

    /// The formal parameters of `proc`, in order.
    fn formals(&self, proc: &ProcedureId) -> Vec<VariableBase>;

    fn return_type(&self, proc: &ProcedureId) -> TypeTag;

    fn type_of(&self, proc: &ProcedureId, path: &AccessPath) -> TypeTag;

    /// True if `callee`'s last parameter type suggests an array-like
    /// variadic (§4.4's variadic-aware filter).
    fn last_param_is_variadic_array(&self, callee: &ProcedureId) -> bool;

    /// Whether the start node of `proc`'s CFG has any successors — used
    /// to distinguish "legitimately no post" from the fatal §4.7/§7
    /// "no post but non-empty CFG" case.
    fn start_node_has_successors(&self, proc: &ProcedureId) -> bool;
}

// ============================================================================
// Taint specification
// ============================================================================

/// A source declaration at a call site (§4.2 step 3). `index = None`
/// means "the callee itself is the source" (bound to the return slot, or
/// to a pass-by-reference tail actual if there is no return slot);
/// `index = Some(i)` means "actual `i` becomes tainted".
pub struct SourceDecl<T: Trace> {
    pub index: Option<usize>,
    pub source: T::Source,
}

/// A sink declaration at a call site (§4.2 step 2).
pub struct SinkDecl<T: Trace> {
    pub actual_index: usize,
    pub sink: T::Sink,
    pub report_reachable: bool,
}

/// Propagation rules for unknown calls (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationRule {
    PropagateToReturn,
    PropagateToReceiver,
    PropagateToActual(usize),
}

/// The taint specification capability bundle (C2's concrete supplier,
/// plus the rest of §6's "Taint specification" interface). Application
/// code supplies one implementation per analysis domain.
pub trait TaintSpecification<T: Trace> {
    fn source_at(&self, caller: &ProcedureId, callee: &ProcedureId, loc: &Span) -> Option<SourceDecl<T>>;

    fn sinks_at(&self, caller: &ProcedureId, callee: &ProcedureId, loc: &Span) -> Vec<SinkDecl<T>>;

    /// `Source.get_tainted_formals`: the formals of `proc` that are
    /// tainted a priori (§4.7 step 2).
    fn tainted_formals(&self, proc: &ProcedureId) -> Vec<(usize, T::Source)>;

    /// `handle_unknown_call`'s propagation-rule list (§4.4).
    fn propagation_rules(&self, callee: &ProcedureId) -> Vec<PropagationRule>;

    fn is_taintable_type(&self, ty: &TypeTag) -> bool;

    /// Manufacture the footprint source for an unseen read at `path`
    /// within `proc` (§4.1).
    fn make_footprint(&self, path: AccessPath, proc: &ProcedureId) -> T::Source;

    /// True iff `summary` is a degenerate empty constructor summary that
    /// should be treated as a skip rather than "apply this summary"
    /// (§4.2 step 4).
    fn is_degenerate_empty_constructor(&self, callee: &ProcedureId, summary: &AccessTree<T>) -> bool {
        let _ = callee;
        summary.is_empty()
    }

    /// Serialization hooks (§6). Identity by default; a concrete spec may
    /// override these to normalize the tree before/after persistence.
    fn to_summary_access_tree(&self, tree: AccessTree<T>) -> AccessTree<T> {
        tree
    }

    fn of_summary_access_tree(&self, tree: AccessTree<T>) -> AccessTree<T> {
        tree
    }
}

// ============================================================================
// Fixpoint engine
// ============================================================================

/// Consumes one instruction and a pre-state, producing a post-state.
/// Must be pure in its state argument (§9: "so the fixpoint engine can
/// freely memoize and re-join"). Returns `Err` only for the fail-fast
/// misuse conditions of §7 (e.g. a callee summary with a return-bound
/// trace at a call site with no return slot) — everything recoverable
/// (missing footprint actuals, unhandled source shapes) is handled
/// in-band by dropping the contribution instead.
pub trait TransferFunction<T: Trace> {
    fn step(&self, state: &AccessTree<T>, instr: &Instruction) -> Result<AccessTree<T>>;
}

/// The result of running the fixpoint engine to completion on one
/// procedure (§4.7 step 4 / §7's "no post but non-empty CFG").
pub enum FixpointOutcome<T: Trace> {
    Post(AccessTree<T>),
    NoPost,
}

/// Accepts a transfer function, an initial state, and (implicitly, via
/// the program model bound to the engine) a CFG; returns the post-state
/// at procedure exit, or none (§6). Propagates `Err` from the transfer
/// function unchanged.
pub trait FixpointEngine<T: Trace> {
    fn run(
        &self,
        proc: &ProcedureId,
        initial: AccessTree<T>,
        transfer: &dyn TransferFunction<T>,
    ) -> Result<FixpointOutcome<T>>;
}

// ============================================================================
// Summary store
// ============================================================================

/// `read_summary(proc, callee) -> option<Summary>`, write-on-completion
/// (§6). Required to be safe to read concurrently (§5).
pub trait SummaryStore<T: Trace>: Send + Sync {
    fn read_summary(&self, caller: &ProcedureId, callee: &ProcedureId) -> Option<AccessTree<T>>;
    fn write_summary(&self, proc: &ProcedureId, summary: AccessTree<T>);
}

// ============================================================================
// Issue reporter
// ============================================================================

/// Receives one reportable path at a time (§4.6). Logging, on-disk
/// serialization, and build integration are all out of scope (§1); this
/// trait is the seam where a host application plugs those in.
pub trait IssueReporter<T: Trace> {
    fn report(
        &self,
        call_site: &crate::features::taint_analysis::domain::CallSite,
        path: &crate::features::taint_analysis::domain::ReportablePath<T::Source, T::Sink>,
    );
}
