//! taintgraph-core - access-path sensitive interprocedural taint analysis
//!
//! Feature-First Hexagonal Architecture:
//! - shared/   : common models (Span, Location)
//! - errors    : crate-wide error type
//! - config    : endpoint-class configuration
//! - features/ : vertical slices (taint_analysis)
//!
//! The analyzer never owns a program representation, a call graph, or a
//! fixpoint scheduler: those are supplied by the host as trait objects
//! (see `features::taint_analysis::ports`). This crate computes summaries
//! and transfer functions over them.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::module_inception)]
#![allow(clippy::new_without_default)]

/// Shared models (source spans, locations)
pub mod shared;

/// Crate-wide error type
pub mod errors;

/// Endpoint-class configuration
pub mod config;

/// Feature modules
pub mod features;

pub use errors::{CodegraphError, Result};
