//! Interprocedural access-path-sensitive taint analysis.
//!
//! Hexagonal layout:
//! - `domain`: the algebraic core — access paths, access trees, the
//!   external `Trace` lattice shape (C1–C3).
//! - `ports`: the interfaces to everything this crate does not own —
//!   the program model, the taint specification, the fixpoint engine,
//!   the summary store, the issue reporter.
//! - `infrastructure`: reference implementations that consume those
//!   ports — footprint lookup, the transfer function, summary
//!   application and construction, the summary store (C4–C7).
//! - `application`: the top-level per-procedure driver that wires the
//!   ports together and drives a procedure to a fixpoint (C8).

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{checker, NoPreAnalysis, PreAnalysis};

pub use domain::{
    AccessPath, AccessStep, AccessTree, CallSite, FootprintAware, LogicalVar, Node, ProcedureId,
    ProgramVar, RawAccessPath, ReportablePath, Subtree, Trace, TypeEnvironment, TypeTag,
    VariableBase,
};

pub use ports::{
    Actual, FixpointEngine, FixpointOutcome, Instruction, IssueReporter, ProgramModel,
    PropagationRule, RhsExpr, SinkDecl, SourceDecl, SummaryStore, TaintSpecification,
    TransferFunction,
};

pub use infrastructure::{
    apply_summary, build_summary, to_caller, GuardedSummaryStore, InMemorySummaryStore,
    StandardTransferFunction, SummaryStoreStats,
};
