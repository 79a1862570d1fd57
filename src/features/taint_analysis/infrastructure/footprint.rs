//! Footprint synthesis (C4): manufacture symbolic input traces for
//! unseen reads of formals/globals (§4.1).

use crate::features::taint_analysis::domain::{
    AccessPath, AccessTree, LogicalVar, Node, ProcedureId, Trace, VariableBase,
};
use crate::features::taint_analysis::ports::{ProgramModel, TaintSpecification};

/// `lookup(ap, tree, ctx) -> option<node>` (§4.1).
///
/// 1. If `tree` already has a node at `ap`, return it.
/// 2. Else, if `ap`'s base is a formal of `current_proc`, manufacture a
///    footprint access path (base replaced by a freshly stamped footprint
///    variable, steps preserved) and return a leaf carrying
///    `of_source(make_footprint(...))`.
/// 3. Else if the base is a global, manufacture a leaf the same way but
///    over the *original* access path (globals keep their own identity
///    as footprint subjects; there is no formal index to stamp with).
/// 4. Else, none: locals that were never written have no taint.
pub fn lookup<T: Trace>(
    ap: &AccessPath,
    tree: &AccessTree<T>,
    program: &dyn ProgramModel,
    spec: &dyn TaintSpecification<T>,
    current_proc: &ProcedureId,
) -> Option<Node<T>> {
    if let Some(node) = tree.get_node(ap) {
        return Some(node);
    }

    let base = ap.base();
    if let Some(i) = program.formal_index(current_proc, base) {
        let footprint_base = VariableBase::Logical(LogicalVar::footprint(i as u32));
        let footprint_ap = ap.with_base(footprint_base);
        let source = spec.make_footprint(footprint_ap, current_proc);
        return Some(Node::leaf(T::of_source(source)));
    }

    if base.is_global() {
        let source = spec.make_footprint(ap.clone(), current_proc);
        return Some(Node::leaf(T::of_source(source)));
    }

    None
}
