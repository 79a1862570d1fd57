//! Access paths: a root base plus an ordered sequence of field/index steps
//! (§3), in two exactness flavors.

use std::fmt;

use super::base::VariableBase;

/// One step in an access path: a field selection or an array index.
/// Array indices are not tracked individually (field-insensitive on
/// indices, per the access-tree's own field-sensitivity boundary).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessStep {
    Field(String),
    Index,
}

impl fmt::Display for AccessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStep::Field(name) => write!(f, ".{name}"),
            AccessStep::Index => write!(f, "[*]"),
        }
    }
}

/// A root base plus its steps, with no exactness flavor attached — the
/// raw shape manipulated by `extract`, `with_base`, and `append`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawAccessPath {
    pub base: VariableBase,
    pub steps: Vec<AccessStep>,
}

impl RawAccessPath {
    pub fn root(base: VariableBase) -> Self {
        Self {
            base,
            steps: Vec::new(),
        }
    }

    pub fn new(base: VariableBase, steps: Vec<AccessStep>) -> Self {
        Self { base, steps }
    }

    /// `extract`: decompose into (base, steps).
    pub fn extract(&self) -> (&VariableBase, &[AccessStep]) {
        (&self.base, &self.steps)
    }

    /// `with_base`: the same steps, rooted at a different base.
    pub fn with_base(&self, base: VariableBase) -> Self {
        Self {
            base,
            steps: self.steps.clone(),
        }
    }
}

impl fmt::Display for RawAccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// An access path in one of its two exactness flavors (§3).
///
/// `Exact` denotes the concrete location; `Abstracted` denotes that
/// location and everything reachable below it. Whether a path is exact
/// or abstracted only matters when *writing* into an access tree (see
/// `AccessTree::add_node`): an abstracted write collapses the subtree at
/// that point into `Subtree::Star`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessPath {
    Exact(RawAccessPath),
    Abstracted(RawAccessPath),
}

impl AccessPath {
    pub fn exact(base: VariableBase, steps: Vec<AccessStep>) -> Self {
        AccessPath::Exact(RawAccessPath::new(base, steps))
    }

    pub fn abstracted(base: VariableBase, steps: Vec<AccessStep>) -> Self {
        AccessPath::Abstracted(RawAccessPath::new(base, steps))
    }

    pub fn raw(&self) -> &RawAccessPath {
        match self {
            AccessPath::Exact(r) | AccessPath::Abstracted(r) => r,
        }
    }

    pub fn base(&self) -> &VariableBase {
        &self.raw().base
    }

    pub fn steps(&self) -> &[AccessStep] {
        &self.raw().steps
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, AccessPath::Exact(_))
    }

    /// Rebase onto a new root, preserving both the trailing steps and the
    /// exactness flavor.
    pub fn with_base(&self, base: VariableBase) -> Self {
        let raw = self.raw().with_base(base);
        match self {
            AccessPath::Exact(_) => AccessPath::Exact(raw),
            AccessPath::Abstracted(_) => AccessPath::Abstracted(raw),
        }
    }

    /// `append(prefix, suffix)`: glue `suffix_steps` onto `prefix`'s tail,
    /// preserving `prefix`'s exactness flavor (§4.3's `to_caller` mapping
    /// relies on this: "preserve the exactness flag").
    pub fn append(prefix: &AccessPath, suffix_steps: &[AccessStep]) -> AccessPath {
        let mut steps = prefix.steps().to_vec();
        steps.extend_from_slice(suffix_steps);
        let raw = RawAccessPath::new(prefix.base().clone(), steps);
        match prefix {
            AccessPath::Exact(_) => AccessPath::Exact(raw),
            AccessPath::Abstracted(_) => AccessPath::Abstracted(raw),
        }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPath::Exact(r) => write!(f, "{r}"),
            AccessPath::Abstracted(r) => write!(f, "{r}*"),
        }
    }
}

/// A coarse type classification, used only to decide array-like-ness
/// (§4.2's sink-injection rule) and taintability (§4.4's propagation
/// filter). The program model is the sole producer of `TypeTag` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Scalar,
    Pointer,
    Array,
    Other(String),
}

impl TypeTag {
    /// True for `T*[]`, `T**`, `T[]`-shaped types, per §4.2 step 2.
    pub fn is_array_like(&self) -> bool {
        matches!(self, TypeTag::Array | TypeTag::Pointer)
    }
}

/// Queried by `type_of(path)` against a type environment supplied by the
/// program model (§3, §6).
pub trait TypeEnvironment {
    fn type_of(&self, path: &AccessPath) -> TypeTag;
}
