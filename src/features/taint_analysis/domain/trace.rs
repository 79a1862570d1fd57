//! The trace domain (C2) — deliberately *external*: §1 places the taint
//! specification (and the trace lattice it defines) out of scope. This
//! module only fixes the capability-bundle shape a concrete taint
//! specification must provide, per §9's guidance: "pass it as a
//! parameter object ... rather than subclassing."
//!
//! Everything in this crate that needs a trace is generic over a type
//! parameter bounded by `Trace`, never over a concrete trace type.

use crate::features::taint_analysis::domain::access_path::AccessPath;
use crate::shared::models::Span;

/// Identifies a procedure. Treated as an opaque, cloneable key throughout
/// — the program model owns its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureId(pub String);

impl ProcedureId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for ProcedureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A call site: the ordered pair of procedures plus a location, used to
/// key reports (§4.6) and to parameterize `Trace::append` (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub caller: ProcedureId,
    pub callee: ProcedureId,
    pub location: Span,
}

/// A source or sink may, in principle, originate from an unknown input
/// rather than a concrete call site; `FootprintAware` lets the core ask
/// "is this the footprint placeholder for access path P?" without
/// knowing the concrete source/sink representation.
pub trait FootprintAware {
    /// `Some(ap)` iff this source is a symbolic input standing for the
    /// value read at `ap` (§3: "Sources expose `get_footprint_access_path`").
    fn get_footprint_access_path(&self) -> Option<AccessPath>;

    /// The fully qualified name of the class/module that declared this
    /// source's call site, if the taint specification tracks one. Used
    /// by §4.6 to decide endpoint annotation.
    fn declaring_class(&self) -> Option<&str> {
        None
    }
}

/// One complete source→sink connection extracted from a trace by
/// `Trace::get_reportable_paths` (§4.6).
#[derive(Debug, Clone)]
pub struct ReportablePath<Src, Snk> {
    pub source: Src,
    pub sink: Snk,
    pub is_endpoint: bool,
}

/// The trace lattice (C2), external per §1. A concrete taint
/// specification supplies one implementation of this trait; the core
/// never constructs a `Self` value except through these operations.
pub trait Trace: Clone {
    type Source: Clone + FootprintAware;
    type Sink: Clone;

    fn empty() -> Self;
    fn of_source(src: Self::Source) -> Self;
    fn add_source(&self, src: Self::Source) -> Self;
    fn add_sink(&self, sink: Self::Sink) -> Self;
    fn sources(&self) -> Vec<Self::Source>;
    fn sinks(&self) -> Vec<Self::Sink>;
    fn is_empty(&self) -> bool;

    /// Lattice join; must be associative, commutative, idempotent
    /// (invariant 2 of §3).
    fn join(&self, other: &Self) -> Self;

    /// Extend a caller trace with a callee trace grafted at `call_site`
    /// (§4.3's grafting step).
    fn append(caller: &Self, callee: &Self, call_site: &CallSite) -> Self;

    /// Replace this trace's source set wholesale (§4.3's footprint-source
    /// substitution uses this to swap a footprint placeholder for the
    /// caller-resolved trace).
    fn update_sources(&self, new_sources: Vec<Self::Source>) -> Self;

    /// Enumerate complete source→sink paths reachable in this trace.
    /// `is_endpoint` classifies a source as configured-endpoint or not
    /// (§4.6); the core supplies this predicate, the trace implementation
    /// does the path enumeration.
    fn get_reportable_paths(
        &self,
        is_endpoint: &dyn Fn(&Self::Source) -> bool,
    ) -> Vec<ReportablePath<Self::Source, Self::Sink>>;

    /// The ordered sequence of call-site locations this trace passed
    /// through on its way here, most recent last — the locations a report
    /// should cite to explain how taint travelled from source to sink
    /// across `Trace::append` grafts. Empty for a trace that never
    /// crossed a call boundary (e.g. a direct same-procedure flow).
    fn to_loc_trace(&self) -> Vec<Span>;

    /// Human-readable rendering, e.g. for log lines.
    fn pp(&self) -> String;
}
