//! Variable bases: the roots of access paths (§3 of the core spec).
//!
//! A base is either a named program variable (as surfaced by the frontend)
//! or a logical variable synthesized by the analyzer itself. Logical
//! variables with `is_footprint` set are the only kind of base this crate
//! invents; everything else is handed to us by the program model.

use std::fmt;

/// A named program variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramVar {
    pub name: String,
    pub is_global: bool,
    pub is_return: bool,
    pub is_frontend_tmp: bool,
}

impl ProgramVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_global: false,
            is_return: false,
            is_frontend_tmp: false,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self {
            is_global: true,
            ..Self::new(name)
        }
    }

    /// The single, well-known return-value variable for a procedure.
    pub fn return_var() -> Self {
        Self {
            is_return: true,
            ..Self::new("$return")
        }
    }

    pub fn frontend_tmp(name: impl Into<String>) -> Self {
        Self {
            is_frontend_tmp: true,
            ..Self::new(name)
        }
    }
}

impl fmt::Display for ProgramVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A synthetic temporary. The analyzer mints these only as footprint
/// variables (§4.1); the `is_footprint` flag exists so the type can also
/// represent other SSA-style temporaries a frontend might introduce
/// without forcing every logical var through the footprint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalVar {
    pub stamp: u32,
    pub is_footprint: bool,
}

impl LogicalVar {
    /// A footprint variable standing for the unknown value read through
    /// formal parameter `formal_index` (0-based), per invariant 3 of §3.
    pub fn footprint(formal_index: u32) -> Self {
        Self {
            stamp: formal_index,
            is_footprint: true,
        }
    }
}

impl fmt::Display for LogicalVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_footprint {
            write!(f, "footprint#{}", self.stamp)
        } else {
            write!(f, "logical#{}", self.stamp)
        }
    }
}

/// The root of an access path: a program variable or a logical variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariableBase {
    Program(ProgramVar),
    Logical(LogicalVar),
}

impl VariableBase {
    pub fn is_global(&self) -> bool {
        matches!(self, VariableBase::Program(p) if p.is_global)
    }

    pub fn is_return(&self) -> bool {
        matches!(self, VariableBase::Program(p) if p.is_return)
    }

    pub fn is_frontend_tmp(&self) -> bool {
        matches!(self, VariableBase::Program(p) if p.is_frontend_tmp)
    }

    pub fn is_footprint(&self) -> bool {
        matches!(self, VariableBase::Logical(l) if l.is_footprint)
    }

    /// `Some(i)` iff this base is a footprint variable standing for formal
    /// index `i`.
    pub fn footprint_stamp(&self) -> Option<u32> {
        match self {
            VariableBase::Logical(l) if l.is_footprint => Some(l.stamp),
            _ => None,
        }
    }

    /// A summary-well-formed base is a global, the return variable, or a
    /// footprint logical var (invariant 5 of §3, invariant 2 of §8).
    pub fn is_summary_well_formed(&self) -> bool {
        self.is_global() || self.is_return() || self.is_footprint()
    }
}

impl fmt::Display for VariableBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableBase::Program(p) => write!(f, "{p}"),
            VariableBase::Logical(l) => write!(f, "{l}"),
        }
    }
}
