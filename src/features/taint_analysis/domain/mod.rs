//! Domain layer: the algebraic core (C1–C3) that has no dependency on
//! any external collaborator. `trace` is the one exception in spirit —
//! it fixes only the *shape* a collaborator-supplied trace type must
//! have, never a concrete lattice.

pub mod access_path;
pub mod access_tree;
pub mod base;
pub mod trace;

pub use access_path::{AccessPath, AccessStep, RawAccessPath, TypeEnvironment, TypeTag};
pub use access_tree::{AccessTree, Node, Subtree};
pub use base::{LogicalVar, ProgramVar, VariableBase};
pub use trace::{CallSite, FootprintAware, ProcedureId, ReportablePath, Trace};
