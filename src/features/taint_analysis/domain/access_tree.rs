//! The access tree domain (C3): a mapping from base to node, where a node
//! is `(trace, subtree)` and a subtree is either a finite map from access
//! step to node, or `Star` (any extension). See §3 and §4.1.

use rustc_hash::FxHashMap;

use super::access_path::{AccessPath, AccessStep, RawAccessPath};
use super::base::VariableBase;
use super::trace::Trace;

/// The children of a node: either named, or collapsed to "anything below
/// here" by an abstracted write (invariant 4 of §3).
#[derive(Debug, Clone)]
pub enum Subtree<T: Trace> {
    Map(FxHashMap<AccessStep, Node<T>>),
    Star,
}

impl<T: Trace> Default for Subtree<T> {
    fn default() -> Self {
        Subtree::Map(FxHashMap::default())
    }
}

impl<T: Trace> Subtree<T> {
    pub fn is_empty(&self) -> bool {
        match self {
            Subtree::Map(m) => m.is_empty(),
            Subtree::Star => false,
        }
    }
}

/// A trace plus whatever lies below it in the tree.
#[derive(Debug, Clone)]
pub struct Node<T: Trace> {
    pub trace: T,
    pub subtree: Subtree<T>,
}

impl<T: Trace> Node<T> {
    pub fn empty() -> Self {
        Self {
            trace: T::empty(),
            subtree: Subtree::default(),
        }
    }

    pub fn leaf(trace: T) -> Self {
        Self {
            trace,
            subtree: Subtree::default(),
        }
    }

    /// `node_join`: pointwise join of traces, with `Star` absorbing any
    /// concrete subtree (a `Star` on either side means "could be
    /// anything", which dominates a finite map).
    pub fn join(&self, other: &Self) -> Self {
        let trace = self.trace.join(&other.trace);
        let subtree = match (&self.subtree, &other.subtree) {
            (Subtree::Star, _) | (_, Subtree::Star) => Subtree::Star,
            (Subtree::Map(a), Subtree::Map(b)) => {
                let mut merged: FxHashMap<AccessStep, Node<T>> = a.clone();
                for (step, node) in b {
                    merged
                        .entry(step.clone())
                        .and_modify(|existing| *existing = existing.join(node))
                        .or_insert_with(|| node.clone());
                }
                Subtree::Map(merged)
            }
        };
        Self { trace, subtree }
    }

    /// A node is empty iff its trace is empty and it has no children
    /// (invariant used by §4.5's Stage B pruning). `Star` never counts as
    /// empty children, since it denotes unbounded structure below.
    pub fn is_empty(&self) -> bool {
        self.trace.is_empty() && self.subtree.is_empty()
    }
}

/// The access-path-indexed state the transfer function threads through a
/// procedure (§3's "Access tree").
#[derive(Debug, Clone)]
pub struct AccessTree<T: Trace> {
    bases: FxHashMap<VariableBase, Node<T>>,
}

impl<T: Trace> Default for AccessTree<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Trace> AccessTree<T> {
    pub fn empty() -> Self {
        Self {
            bases: FxHashMap::default(),
        }
    }

    pub fn iter_bases(&self) -> impl Iterator<Item = (&VariableBase, &Node<T>)> {
        self.bases.iter()
    }

    fn lookup_steps(node: &Node<T>, steps: &[AccessStep]) -> Option<Node<T>> {
        if steps.is_empty() {
            return Some(node.clone());
        }
        match &node.subtree {
            // Invariant 4: a lookup on a Star subtree returns the trace at
            // the star's root, and further descent stays Star.
            Subtree::Star => Some(Node {
                trace: node.trace.clone(),
                subtree: Subtree::Star,
            }),
            Subtree::Map(m) => m
                .get(&steps[0])
                .and_then(|child| Self::lookup_steps(child, &steps[1..])),
        }
    }

    /// `get_node(ap, tree)`.
    pub fn get_node(&self, ap: &AccessPath) -> Option<Node<T>> {
        let raw = ap.raw();
        let root = self.bases.get(&raw.base)?;
        Self::lookup_steps(root, &raw.steps)
    }

    fn insert_steps(node: &mut Node<T>, steps: &[AccessStep], leaf: Node<T>, abstracted: bool) {
        if steps.is_empty() {
            if abstracted {
                node.trace = leaf.trace;
                node.subtree = Subtree::Star;
            } else {
                *node = leaf;
            }
            return;
        }
        if let Subtree::Star = node.subtree {
            // A Star ancestor already subsumes anything written deeper;
            // nothing finer-grained can be recorded below it.
            return;
        }
        let Subtree::Map(m) = &mut node.subtree else {
            unreachable!("Star handled above")
        };
        let child = m.entry(steps[0].clone()).or_insert_with(Node::empty);
        Self::insert_steps(child, &steps[1..], leaf, abstracted);
    }

    /// `add_node(ap, node, tree)`. An `Exact` write replaces the node at
    /// `ap` wholesale; an `Abstracted` write collapses the subtree there
    /// to `Star`, carrying only the given trace at the root.
    pub fn add_node(&mut self, ap: &AccessPath, leaf: Node<T>) {
        let raw = ap.raw();
        let root = self.bases.entry(raw.base.clone()).or_insert_with(Node::empty);
        Self::insert_steps(root, &raw.steps, leaf, !ap.is_exact());
    }

    /// `add_trace(ap, trace, tree)`: write only the trace at `ap`,
    /// preserving whatever subtree is already there (§4.3's grafting step
    /// explicitly requires this).
    pub fn add_trace(&mut self, ap: &AccessPath, trace: T) {
        let existing_subtree = self
            .get_node(ap)
            .map(|n| n.subtree)
            .unwrap_or_default();
        self.add_node(
            ap,
            Node {
                trace,
                subtree: existing_subtree,
            },
        );
    }

    /// `trace_fold`: visit every `(access_path, trace)` pair recorded in
    /// the tree. A `Star` subtree yields one `Abstracted` entry for
    /// everything beneath it and then stops descending (there is nothing
    /// more specific to visit).
    pub fn trace_fold<F: FnMut(&AccessPath, &T)>(&self, mut f: F) {
        fn walk<T: Trace, F: FnMut(&AccessPath, &T)>(
            base: &VariableBase,
            steps: Vec<AccessStep>,
            node: &Node<T>,
            f: &mut F,
        ) {
            match &node.subtree {
                Subtree::Star => {
                    let ap = AccessPath::abstracted(base.clone(), steps);
                    f(&ap, &node.trace);
                }
                Subtree::Map(m) => {
                    let ap = AccessPath::exact(base.clone(), steps.clone());
                    f(&ap, &node.trace);
                    for (step, child) in m {
                        let mut child_steps = steps.clone();
                        child_steps.push(step.clone());
                        walk(base, child_steps, child, f);
                    }
                }
            }
        }

        for (base, node) in &self.bases {
            walk(base, Vec::new(), node, &mut f);
        }
    }

    /// `node_fold`: like `trace_fold`, but yields the whole node (trace and
    /// subtree) at each recorded access path. Summary construction (§4.5)
    /// needs the subtree alongside the trace; `trace_fold` alone discards
    /// it.
    pub fn node_fold<F: FnMut(&AccessPath, &Node<T>)>(&self, mut f: F) {
        fn walk<T: Trace, F: FnMut(&AccessPath, &Node<T>)>(
            base: &VariableBase,
            steps: Vec<AccessStep>,
            node: &Node<T>,
            f: &mut F,
        ) {
            match &node.subtree {
                Subtree::Star => {
                    let ap = AccessPath::abstracted(base.clone(), steps);
                    f(&ap, node);
                }
                Subtree::Map(m) => {
                    let ap = AccessPath::exact(base.clone(), steps.clone());
                    f(&ap, node);
                    for (step, child) in m {
                        let mut child_steps = steps.clone();
                        child_steps.push(step.clone());
                        walk(base, child_steps, child, f);
                    }
                }
            }
        }

        for (base, node) in &self.bases {
            walk(base, Vec::new(), node, &mut f);
        }
    }

    /// Pointwise join over every base (invariant 2 of §3: associative,
    /// commutative, idempotent because `Node::join` is).
    pub fn join(&self, other: &Self) -> Self {
        let mut bases = self.bases.clone();
        for (base, node) in &other.bases {
            bases
                .entry(base.clone())
                .and_modify(|existing| *existing = existing.join(node))
                .or_insert_with(|| node.clone());
        }
        Self { bases }
    }

    pub fn is_empty(&self) -> bool {
        self.bases.values().all(Node::is_empty)
    }
}
