//! Summary application (C6): graft a callee summary into caller state;
//! substitute footprint vars with actuals (§4.3).

use crate::errors::{CodegraphError, Result};
use crate::features::taint_analysis::domain::{
    AccessPath, AccessTree, CallSite, FootprintAware, Node, Trace,
};
use crate::features::taint_analysis::infrastructure::reporting;
use crate::features::taint_analysis::ports::{Actual, IssueReporter};

/// `to_caller(formal_ap)`: translate a summary-side access path into the
/// caller's access-path space (§4.3).
///
/// - Return base: rebased onto the caller's return slot, `Err` if there
///   is none (§7's "return binding missing" — fail fast).
/// - Footprint base with stamp `i`: rebased onto actual `i`'s access
///   path, `Ok(None)` if that actual is missing or not an access path
///   (§7's "missing footprint actual" — silently drop).
/// - Anything else (a global): used as-is.
pub fn to_caller<T: Trace>(
    formal_ap: &AccessPath,
    actuals: &[Actual],
    ret: &Option<AccessPath>,
) -> Result<Option<AccessPath>> {
    let base = formal_ap.base();

    if base.is_return() {
        return match ret {
            Some(ret_ap) => Ok(Some(AccessPath::append(ret_ap, formal_ap.steps()))),
            None => Err(CodegraphError::return_binding_missing(format!(
                "callee summary carries a trace at {formal_ap} but the call site provides no return slot"
            ))),
        };
    }

    if let Some(i) = base.footprint_stamp() {
        return match actuals.get(i as usize).and_then(Actual::as_path) {
            Some(actual_ap) => Ok(Some(AccessPath::append(actual_ap, formal_ap.steps()))),
            None => Ok(None),
        };
    }

    Ok(Some(formal_ap.clone()))
}

/// Replace footprint-typed sources in `trace` with the caller trace found
/// at their translated access path (§4.3's "footprint-source
/// substitution"). Sources whose translation is undefined are left
/// untouched rather than dropped — they still carry whatever information
/// the callee attached to them.
fn substitute_footprint_sources<T: Trace>(
    trace: &T,
    actuals: &[Actual],
    ret: &Option<AccessPath>,
    caller_tree: &AccessTree<T>,
) -> T {
    let mut new_sources = Vec::new();
    for src in trace.sources() {
        if let Some(fp_ap) = src.get_footprint_access_path() {
            if let Ok(Some(caller_ap)) = to_caller::<T>(&fp_ap, actuals, ret) {
                let caller_trace = caller_tree
                    .get_node(&caller_ap)
                    .map(|n| n.trace)
                    .unwrap_or_else(T::empty);
                new_sources.extend(caller_trace.sources());
                continue;
            }
        }
        new_sources.push(src);
    }
    trace.update_sources(new_sources)
}

/// Graft `summary` into `caller_tree` at `call_site` (§4.3's "Grafting").
pub fn apply_summary<T: Trace>(
    caller_tree: &AccessTree<T>,
    actuals: &[Actual],
    ret: &Option<AccessPath>,
    summary: &AccessTree<T>,
    call_site: &CallSite,
    reporter: &dyn IssueReporter<T>,
) -> Result<AccessTree<T>> {
    let mut result = caller_tree.clone();

    let mut entries: Vec<(AccessPath, T)> = Vec::new();
    summary.trace_fold(|ap, trace| entries.push((ap.clone(), trace.clone())));

    for (callee_ap, callee_trace) in entries {
        let substituted = substitute_footprint_sources(&callee_trace, actuals, ret, &result);

        match to_caller::<T>(&callee_ap, actuals, ret)? {
            None => {
                // Undefined translation: still run the reporter against the
                // instantiated trace (caller trace defaulted to empty), but
                // do not touch the tree.
                let instantiated = T::append(&T::empty(), &substituted, call_site);
                reporting::enumerate_and_report(&instantiated, call_site, reporter);
            }
            Some(caller_ap) => {
                let caller_node = result.get_node(&caller_ap).unwrap_or_else(Node::empty);
                let appended = T::append(&caller_node.trace, &substituted, call_site);
                reporting::enumerate_and_report(&appended, call_site, reporter);
                result.add_trace(&caller_ap, appended);
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::taint_analysis::domain::{
        AccessStep, FootprintAware, LogicalVar, ProcedureId, ProgramVar, ReportablePath,
        VariableBase,
    };
    use crate::shared::models::Span;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestSource {
        tag: u32,
    }

    impl FootprintAware for TestSource {
        fn get_footprint_access_path(&self) -> Option<AccessPath> {
            None
        }
    }

    #[derive(Debug, Clone, Default)]
    struct TestTrace {
        sources: Vec<TestSource>,
        sinks: u32,
    }

    impl Trace for TestTrace {
        type Source = TestSource;
        type Sink = ();
        fn empty() -> Self {
            Self::default()
        }
        fn of_source(src: Self::Source) -> Self {
            Self {
                sources: vec![src],
                sinks: 0,
            }
        }
        fn add_source(&self, src: Self::Source) -> Self {
            let mut sources = self.sources.clone();
            sources.push(src);
            Self { sources, sinks: self.sinks }
        }
        fn add_sink(&self, _sink: Self::Sink) -> Self {
            Self {
                sources: self.sources.clone(),
                sinks: self.sinks + 1,
            }
        }
        fn sources(&self) -> Vec<Self::Source> {
            self.sources.clone()
        }
        fn sinks(&self) -> Vec<Self::Sink> {
            (0..self.sinks).map(|_| ()).collect()
        }
        fn is_empty(&self) -> bool {
            self.sources.is_empty() && self.sinks == 0
        }
        fn join(&self, other: &Self) -> Self {
            let mut sources = self.sources.clone();
            sources.extend(other.sources.clone());
            Self {
                sources,
                sinks: self.sinks.max(other.sinks),
            }
        }
        fn append(caller: &Self, callee: &Self, _call_site: &CallSite) -> Self {
            caller.join(callee)
        }
        fn update_sources(&self, new_sources: Vec<Self::Source>) -> Self {
            Self {
                sources: new_sources,
                sinks: self.sinks,
            }
        }
        fn get_reportable_paths(
            &self,
            is_endpoint: &dyn Fn(&Self::Source) -> bool,
        ) -> Vec<ReportablePath<Self::Source, Self::Sink>> {
            if self.sinks == 0 || self.sources.is_empty() {
                return vec![];
            }
            self.sources
                .iter()
                .map(|s| ReportablePath {
                    source: s.clone(),
                    sink: (),
                    is_endpoint: is_endpoint(s),
                })
                .collect()
        }
        fn to_loc_trace(&self) -> Vec<Span> {
            Vec::new()
        }

        fn pp(&self) -> String {
            format!("{} sources, {} sinks", self.sources.len(), self.sinks)
        }
    }

    struct NullReporter;
    impl IssueReporter<TestTrace> for NullReporter {
        fn report(&self, _call_site: &CallSite, _path: &ReportablePath<TestSource, ()>) {}
    }

    struct CountingReporter {
        count: RefCell<usize>,
    }
    impl IssueReporter<TestTrace> for CountingReporter {
        fn report(&self, _call_site: &CallSite, _path: &ReportablePath<TestSource, ()>) {
            *self.count.borrow_mut() += 1;
        }
    }

    fn var(name: &str) -> VariableBase {
        VariableBase::Program(ProgramVar::new(name))
    }

    fn site() -> CallSite {
        CallSite {
            caller: ProcedureId::new("caller"),
            callee: ProcedureId::new("callee"),
            location: Span::zero(),
        }
    }

    #[test]
    fn to_caller_rebases_return_onto_ret_slot() {
        let formal_ap = AccessPath::exact(VariableBase::Program(ProgramVar::return_var()), vec![]);
        let ret = Some(AccessPath::exact(var("y"), vec![]));
        let result = to_caller::<TestTrace>(&formal_ap, &[], &ret).unwrap();
        assert_eq!(result, Some(AccessPath::exact(var("y"), vec![])));
    }

    #[test]
    fn to_caller_errors_on_return_with_no_ret_slot() {
        let formal_ap = AccessPath::exact(VariableBase::Program(ProgramVar::return_var()), vec![]);
        let result = to_caller::<TestTrace>(&formal_ap, &[], &None);
        assert!(result.is_err());
    }

    #[test]
    fn to_caller_rebases_footprint_onto_actual() {
        let formal_ap = AccessPath::exact(
            VariableBase::Logical(LogicalVar::footprint(0)),
            vec![AccessStep::Field("f".into())],
        );
        let actuals = vec![Actual::Path(AccessPath::exact(var("a"), vec![]))];
        let result = to_caller::<TestTrace>(&formal_ap, &actuals, &None).unwrap();
        assert_eq!(
            result,
            Some(AccessPath::exact(var("a"), vec![AccessStep::Field("f".into())]))
        );
    }

    #[test]
    fn to_caller_drops_footprint_with_non_path_actual() {
        let formal_ap = AccessPath::exact(VariableBase::Logical(LogicalVar::footprint(0)), vec![]);
        let actuals = vec![Actual::Other];
        let result = to_caller::<TestTrace>(&formal_ap, &actuals, &None).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn to_caller_drops_footprint_with_missing_actual() {
        let formal_ap = AccessPath::exact(VariableBase::Logical(LogicalVar::footprint(2)), vec![]);
        let result = to_caller::<TestTrace>(&formal_ap, &[], &None).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn to_caller_passes_through_globals_unchanged() {
        let formal_ap = AccessPath::exact(VariableBase::Program(ProgramVar::global("g")), vec![]);
        let result = to_caller::<TestTrace>(&formal_ap, &[], &None).unwrap();
        assert_eq!(result, Some(formal_ap));
    }

    #[test]
    fn applying_empty_summary_leaves_caller_tree_unchanged_and_reports_nothing() {
        let caller_tree: AccessTree<TestTrace> = AccessTree::empty();
        let summary: AccessTree<TestTrace> = AccessTree::empty();
        let reporter = CountingReporter {
            count: RefCell::new(0),
        };
        let result = apply_summary(&caller_tree, &[], &None, &summary, &site(), &reporter).unwrap();
        assert!(result.is_empty());
        assert_eq!(*reporter.count.borrow(), 0);
    }

    #[test]
    fn applying_summary_with_sink_at_footprint_reports_through_actual() {
        let mut summary: AccessTree<TestTrace> = AccessTree::empty();
        let footprint_ap = AccessPath::exact(VariableBase::Logical(LogicalVar::footprint(0)), vec![]);
        summary.add_node(
            &footprint_ap,
            crate::features::taint_analysis::domain::Node::leaf(TestTrace {
                sources: vec![TestSource {
                    tag: 1,
                }],
                sinks: 1,
            }),
        );

        let mut caller_tree: AccessTree<TestTrace> = AccessTree::empty();
        let source_ap = AccessPath::exact(var("a"), vec![]);
        caller_tree.add_node(
            &source_ap,
            crate::features::taint_analysis::domain::Node::leaf(TestTrace {
                sources: vec![TestSource {
                    tag: 2,
                }],
                sinks: 0,
            }),
        );

        let actuals = vec![Actual::Path(source_ap.clone())];
        let reporter = CountingReporter {
            count: RefCell::new(0),
        };
        let result =
            apply_summary(&caller_tree, &actuals, &None, &summary, &site(), &reporter).unwrap();

        let node = result.get_node(&source_ap).unwrap();
        assert_eq!(node.trace.sinks, 1);
        assert_eq!(*reporter.count.borrow(), 1);
    }
}
