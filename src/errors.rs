//! Crate-wide error type.
//!
//! Distinguishes recoverable semantic gaps (handled inline, never surfaced
//! here) from programmer/spec errors (fail fast via this type). See
//! `features::taint_analysis` for which disposition each call site chooses.

use thiserror::Error;

/// Errors raised by taintgraph-core.
#[derive(Debug, Error)]
pub enum CodegraphError {
    /// A source or sink declaration names an actual-parameter index that
    /// does not exist on the call.
    #[error("malformed taint spec: {0}")]
    MalformedTaintSpec(String),

    /// A callee summary carries a trace at the return base but the call
    /// site provides no return slot to bind it to.
    #[error("return binding missing: {0}")]
    ReturnBindingMissing(String),

    /// An unknown `operator=` call does not match the expected 2-actual
    /// access-path shape.
    #[error("unexpected operator= shape: {0}")]
    UnexpectedOperatorAssignShape(String),

    /// The fixpoint engine produced no post-state for a start node that
    /// has successors.
    #[error("no post but non-empty CFG for {0}")]
    NoPostNonEmptyCfg(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error, e.g. reading the endpoint-class configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CodegraphError {
    pub fn malformed_taint_spec(msg: impl Into<String>) -> Self {
        CodegraphError::MalformedTaintSpec(msg.into())
    }

    pub fn return_binding_missing(msg: impl Into<String>) -> Self {
        CodegraphError::ReturnBindingMissing(msg.into())
    }

    pub fn unexpected_operator_assign_shape(msg: impl Into<String>) -> Self {
        CodegraphError::UnexpectedOperatorAssignShape(msg.into())
    }

    pub fn no_post_non_empty_cfg(msg: impl Into<String>) -> Self {
        CodegraphError::NoPostNonEmptyCfg(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CodegraphError::Config(msg.into())
    }
}

/// Result type alias for taintgraph-core operations.
pub type Result<T> = std::result::Result<T, CodegraphError>;
