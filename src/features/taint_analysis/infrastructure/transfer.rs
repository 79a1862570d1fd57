//! The transfer function (C5): `Assign` and `Call` semantics (§4.2), plus
//! the unknown-call sub-protocol (§4.4). This is the component every
//! fixpoint step runs through.

use crate::errors::{CodegraphError, Result};
use crate::features::taint_analysis::domain::{
    AccessPath, AccessTree, CallSite, FootprintAware, Node, ProcedureId, Trace, TypeTag,
};
use crate::features::taint_analysis::infrastructure::{footprint, reporting, summary_apply};
use crate::features::taint_analysis::ports::{
    Actual, Instruction, IssueReporter, ProgramModel, PropagationRule, RhsExpr, SummaryStore,
    TaintSpecification, TransferFunction,
};
use crate::shared::models::Span;

/// The number of virtual-dispatch targets above which polymorphism is
/// given up on entirely rather than joining every target's effect (§4.2
/// step 1's documented unsoundness).
const DEFAULT_MAX_CALLS: usize = 3;

/// The reference transfer function: wires C4 (footprint), C6 (summary
/// application) and the reporter together over a program model and a
/// taint specification (§4.2).
pub struct StandardTransferFunction<'a, T: Trace> {
    current_proc: ProcedureId,
    program: &'a dyn ProgramModel,
    spec: &'a dyn TaintSpecification<T>,
    store: &'a dyn SummaryStore<T>,
    reporter: &'a dyn IssueReporter<T>,
    max_calls: usize,
}

impl<'a, T: Trace> StandardTransferFunction<'a, T> {
    pub fn new(
        current_proc: ProcedureId,
        program: &'a dyn ProgramModel,
        spec: &'a dyn TaintSpecification<T>,
        store: &'a dyn SummaryStore<T>,
        reporter: &'a dyn IssueReporter<T>,
    ) -> Self {
        Self {
            current_proc,
            program,
            spec,
            store,
            reporter,
            max_calls: DEFAULT_MAX_CALLS,
        }
    }

    pub fn with_max_calls(mut self, max_calls: usize) -> Self {
        self.max_calls = max_calls;
        self
    }

    fn step_assign(&self, state: &AccessTree<T>, lhs: &AccessPath, rhs: &RhsExpr) -> AccessTree<T> {
        if lhs.base().is_return() {
            if matches!(rhs, RhsExpr::ExceptionValue) {
                return state.clone();
            }
            let return_is_void = matches!(
                self.program.return_type(&self.current_proc),
                TypeTag::Other(ref s) if s.eq_ignore_ascii_case("void")
            );
            if matches!(rhs, RhsExpr::NullLiteral) && return_is_void {
                return state.clone();
            }
        }

        let node = match rhs {
            RhsExpr::Path(ap) => {
                footprint::lookup(ap, state, self.program, self.spec, &self.current_proc)
                    .unwrap_or_else(Node::empty)
            }
            _ => Node::empty(),
        };

        let mut next = state.clone();
        next.add_node(&AccessPath::exact(lhs.base().clone(), lhs.steps().to_vec()), node);
        next
    }

    fn step_call(
        &self,
        state: &AccessTree<T>,
        ret: &Option<AccessPath>,
        callee: &ProcedureId,
        dynamic_targets: &[ProcedureId],
        actuals: &[Actual],
        managed_language: bool,
        short_method_name: &str,
        loc: &Span,
    ) -> Result<AccessTree<T>> {
        let targets: Vec<ProcedureId> = if dynamic_targets.len() > self.max_calls {
            vec![callee.clone()]
        } else {
            let mut v = Vec::with_capacity(1 + dynamic_targets.len());
            v.push(callee.clone());
            v.extend(dynamic_targets.iter().cloned());
            v
        };

        let mut joined: Option<AccessTree<T>> = None;
        for target in &targets {
            let post = self.step_call_single(
                state,
                ret,
                target,
                actuals,
                managed_language,
                short_method_name,
                loc,
            )?;
            joined = Some(match joined {
                Some(acc) => acc.join(&post),
                None => post,
            });
        }
        Ok(joined.unwrap_or_else(|| state.clone()))
    }

    fn step_call_single(
        &self,
        state: &AccessTree<T>,
        ret: &Option<AccessPath>,
        target: &ProcedureId,
        actuals: &[Actual],
        managed_language: bool,
        short_method_name: &str,
        loc: &Span,
    ) -> Result<AccessTree<T>> {
        let mut working = state.clone();
        let call_site = CallSite {
            caller: self.current_proc.clone(),
            callee: target.clone(),
            location: loc.clone(),
        };

        let mut matched = false;

        // Step 2 — sink injection.
        for sink_decl in self.spec.sinks_at(&self.current_proc, target, loc) {
            let Some(actual) = actuals.get(sink_decl.actual_index) else {
                return Err(CodegraphError::malformed_taint_spec(format!(
                    "sink declared at actual index {} for call to {target} has no matching actual ({} actuals)",
                    sink_decl.actual_index,
                    actuals.len()
                )));
            };
            let Some(actual_ap) = actual.as_path() else {
                continue;
            };
            let ty = self.program.type_of(&self.current_proc, actual_ap);
            let use_abstracted = sink_decl.report_reachable || ty.is_array_like();
            let lookup_ap = if use_abstracted {
                AccessPath::abstracted(actual_ap.base().clone(), actual_ap.steps().to_vec())
            } else {
                AccessPath::exact(actual_ap.base().clone(), actual_ap.steps().to_vec())
            };
            if let Some(node) =
                footprint::lookup(&lookup_ap, &working, self.program, self.spec, &self.current_proc)
            {
                matched = true;
                let updated = node.trace.add_sink(sink_decl.sink.clone());
                reporting::enumerate_and_report(&updated, &call_site, self.reporter);
                working.add_trace(&lookup_ap, updated);
            }
        }

        // Step 3 — source injection.
        if let Some(decl) = self.spec.source_at(&self.current_proc, target, loc) {
            match decl.index {
                None => match ret {
                    Some(ret_ap) => {
                        matched = true;
                        let target_ap = AccessPath::exact(ret_ap.base().clone(), vec![]);
                        working.add_node(&target_ap, Node::leaf(T::of_source(decl.source.clone())));
                    }
                    None => {
                        let pass_by_ref_tail = (!managed_language)
                            .then(|| actuals.last())
                            .flatten()
                            .and_then(Actual::as_path)
                            .filter(|ap| ap.base().is_frontend_tmp());
                        match pass_by_ref_tail {
                            Some(tail_ap) => {
                                matched = true;
                                let node = footprint::lookup(
                                    tail_ap,
                                    &working,
                                    self.program,
                                    self.spec,
                                    &self.current_proc,
                                )
                                .unwrap_or_else(Node::empty);
                                let updated = node.trace.add_source(decl.source.clone());
                                working.add_trace(tail_ap, updated);
                            }
                            None => {
                                tracing::warn!(
                                    callee = %target,
                                    "source call with no return slot and no pass-by-reference tail actual; skipping"
                                );
                            }
                        }
                    }
                },
                Some(i) => {
                    let Some(actual) = actuals.get(i) else {
                        return Err(CodegraphError::malformed_taint_spec(format!(
                            "source declared at actual index {i} for call to {target} has no matching actual ({} actuals)",
                            actuals.len()
                        )));
                    };
                    if let Some(actual_ap) = actual.as_path() {
                        matched = true;
                        let node = footprint::lookup(
                            actual_ap,
                            &working,
                            self.program,
                            self.spec,
                            &self.current_proc,
                        )
                        .unwrap_or_else(Node::empty);
                        let updated = node.trace.add_source(decl.source.clone());
                        working.add_trace(actual_ap, updated);
                    }
                }
            }
        }

        // Step 4 — summary application or unknown-call propagation.
        if !matched {
            let summary = self.store.read_summary(&self.current_proc, target);
            match summary {
                Some(summary) if !self.spec.is_degenerate_empty_constructor(target, &summary) => {
                    working = summary_apply::apply_summary(
                        &working,
                        actuals,
                        ret,
                        &summary,
                        &call_site,
                        self.reporter,
                    )?;
                }
                _ => {
                    working = self.handle_unknown_call(
                        &working,
                        ret,
                        target,
                        actuals,
                        managed_language,
                        short_method_name,
                    )?;
                }
            }
        }

        Ok(working)
    }

    /// The §4.4 unknown-call sub-protocol.
    fn handle_unknown_call(
        &self,
        state: &AccessTree<T>,
        ret: &Option<AccessPath>,
        target: &ProcedureId,
        actuals: &[Actual],
        managed_language: bool,
        short_method_name: &str,
    ) -> Result<AccessTree<T>> {
        if !managed_language && short_method_name == "operator=" {
            let [lhs, rhs] = actuals else {
                return Err(CodegraphError::unexpected_operator_assign_shape(format!(
                    "operator= call to {target} had {} actuals, expected exactly 2",
                    actuals.len()
                )));
            };
            let Some(lhs_ap) = lhs.as_path() else {
                return Err(CodegraphError::unexpected_operator_assign_shape(format!(
                    "operator= call to {target}: left-hand actual is not a path"
                )));
            };
            let rhs_expr = match rhs {
                Actual::Path(ap) => RhsExpr::Path(ap.clone()),
                Actual::Other => RhsExpr::Other,
            };
            return Ok(self.step_assign(state, lhs_ap, &rhs_expr));
        }

        let variadic_override = self.program.last_param_is_variadic_array(target);
        let is_taintable = |ty: &TypeTag| variadic_override || self.spec.is_taintable_type(ty);

        let mut working = state.clone();
        for rule in self.spec.propagation_rules(target) {
            working = self.apply_propagation_rule(&working, rule, ret, actuals, &is_taintable);
        }
        Ok(working)
    }

    fn apply_propagation_rule(
        &self,
        state: &AccessTree<T>,
        rule: PropagationRule,
        ret: &Option<AccessPath>,
        actuals: &[Actual],
        is_taintable: &dyn Fn(&TypeTag) -> bool,
    ) -> AccessTree<T> {
        match rule {
            PropagationRule::PropagateToReturn => {
                let Some(ret_ap) = ret else { return state.clone() };
                self.propagate_into(state, ret_ap, actuals.iter(), is_taintable)
            }
            PropagationRule::PropagateToReceiver => {
                let Some((receiver, rest)) = actuals.split_first() else {
                    return state.clone();
                };
                let Some(receiver_ap) = receiver.as_path() else {
                    return state.clone();
                };
                self.propagate_into(state, receiver_ap, rest.iter(), is_taintable)
            }
            PropagationRule::PropagateToActual(i) => {
                let Some(target_ap) = actuals.get(i).and_then(Actual::as_path) else {
                    return state.clone();
                };
                self.propagate_into(state, target_ap, actuals.iter(), is_taintable)
            }
        }
    }

    /// Aggregate sources from `from` into `into`, filtered per §4.4's
    /// taintability rule, and join the result. Does not write if the
    /// filtered source set is empty.
    fn propagate_into<'actuals>(
        &self,
        state: &AccessTree<T>,
        into: &AccessPath,
        from: impl Iterator<Item = &'actuals Actual>,
        is_taintable: &dyn Fn(&TypeTag) -> bool,
    ) -> AccessTree<T> {
        let mut sources = Vec::new();
        for actual in from {
            let Some(actual_ap) = actual.as_path() else {
                continue;
            };
            if actual_ap == into {
                continue;
            }
            let Some(node) =
                footprint::lookup(actual_ap, state, self.program, self.spec, &self.current_proc)
            else {
                continue;
            };
            for src in node.trace.sources() {
                let taintable = match src.get_footprint_access_path() {
                    Some(fp_ap) => {
                        let ty = self.program.type_of(&self.current_proc, &fp_ap);
                        is_taintable(&ty)
                    }
                    None => true,
                };
                if taintable {
                    sources.push(src);
                }
            }
        }

        if sources.is_empty() {
            return state.clone();
        }

        let existing = state
            .get_node(into)
            .map(|n| n.trace)
            .unwrap_or_else(T::empty);
        let mut merged = existing;
        for src in sources {
            merged = merged.add_source(src);
        }
        let mut next = state.clone();
        next.add_trace(into, merged);
        next
    }
}

impl<'a, T: Trace> TransferFunction<T> for StandardTransferFunction<'a, T> {
    fn step(&self, state: &AccessTree<T>, instr: &Instruction) -> Result<AccessTree<T>> {
        match instr {
            Instruction::Assign { lhs, rhs } => Ok(self.step_assign(state, lhs, rhs)),
            Instruction::Call {
                ret,
                callee,
                dynamic_targets,
                actuals,
                managed_language,
                short_method_name,
                loc,
            } => self.step_call(
                state,
                ret,
                callee,
                dynamic_targets,
                actuals,
                *managed_language,
                short_method_name,
                loc,
            ),
        }
    }
}
