//! Summary construction (C7): turn a procedure's final access tree into a
//! reusable summary (§4.5).

use crate::features::taint_analysis::domain::{
    AccessPath, AccessTree, FootprintAware, LogicalVar, Node, ProcedureId, Subtree, Trace,
    VariableBase,
};
use crate::features::taint_analysis::ports::{ProgramModel, TaintSpecification};

fn root(base: &VariableBase) -> AccessPath {
    AccessPath::exact(base.clone(), vec![])
}

/// Stage A: for every node with a non-empty sink set, join that node into
/// the node presently recorded at each of its footprint sources' access
/// paths, so a sink reachable from input `F` is recorded at `F` itself.
fn reattach_footprint_sources<T: Trace>(tree: &AccessTree<T>) -> AccessTree<T> {
    let mut entries: Vec<(AccessPath, Node<T>)> = Vec::new();
    tree.node_fold(|ap, node| entries.push((ap.clone(), node.clone())));

    let mut result = tree.clone();
    for (_ap, node) in &entries {
        if node.trace.sinks().is_empty() {
            continue;
        }
        for src in node.trace.sources() {
            if let Some(footprint_ap) = src.get_footprint_access_path() {
                let current = result.get_node(&footprint_ap).unwrap_or_else(Node::empty);
                result.add_node(&footprint_ap, current.join(node));
            }
        }
    }
    result
}

/// A node counts as prunable for Stage B's purposes if its trace carries
/// no summary-relevant information (sinks only, for managed languages;
/// fully empty, otherwise) and its subtree records nothing further. A
/// `Star` subtree with an otherwise-empty trace is prunable too — it
/// carries no concrete structure worth keeping.
fn is_prunable<T: Trace>(node: &Node<T>, managed_language: bool) -> bool {
    let trace_empty = if managed_language {
        node.trace.sinks().is_empty()
    } else {
        node.trace.is_empty()
    };
    let subtree_empty = match &node.subtree {
        Subtree::Map(m) => m.is_empty(),
        Subtree::Star => true,
    };
    trace_empty && subtree_empty
}

/// Stage B: re-key the tree by formal index, dropping locals.
fn rekey_by_formal_index<T: Trace>(
    tree: &AccessTree<T>,
    program: &dyn ProgramModel,
    proc: &ProcedureId,
    managed_language: bool,
) -> AccessTree<T> {
    let mut staged: AccessTree<T> = AccessTree::empty();

    for (base, node) in tree.iter_bases() {
        if base.is_global() || base.is_return() {
            staged.add_node(&root(base), node.clone());
            continue;
        }

        if base.is_footprint() {
            if is_prunable(node, managed_language) {
                continue;
            }
            let mut kept = node.clone();
            if kept.trace.sinks().is_empty() {
                kept.trace = T::empty();
            }
            staged.add_node(&root(base), kept);
            continue;
        }

        if let Some(i) = program.formal_index(proc, base) {
            let footprint_base = VariableBase::Logical(LogicalVar::footprint(i as u32));
            let ap = root(&footprint_base);
            let merged = match staged.get_node(&ap) {
                Some(existing) => existing.join(node),
                None => node.clone(),
            };
            staged.add_node(&ap, merged);
            continue;
        }

        // Locals have no caller-visible identity; drop them.
    }

    staged
}

/// Transform a procedure's post-fixpoint access tree into a summary
/// (§4.5), then hand it to the taint spec's serialization hook.
pub fn build_summary<T: Trace>(
    post: &AccessTree<T>,
    program: &dyn ProgramModel,
    spec: &dyn TaintSpecification<T>,
    proc: &ProcedureId,
    managed_language: bool,
) -> AccessTree<T> {
    let staged = reattach_footprint_sources(post);
    let rekeyed = rekey_by_formal_index(&staged, program, proc, managed_language);
    spec.to_summary_access_tree(rekeyed)
}
