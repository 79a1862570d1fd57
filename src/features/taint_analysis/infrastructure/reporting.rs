//! Reporting (§4.6): enumerate reportable source→sink paths in a trace
//! and hand each one to the issue reporter, annotated with whether its
//! source is a configured endpoint.

use crate::config;
use crate::features::taint_analysis::domain::{CallSite, Trace};
use crate::features::taint_analysis::ports::IssueReporter;

/// Runs `Trace::get_reportable_paths` with the endpoint predicate wired
/// to the process-wide configured set (§4.6, §6), then reports each path
/// at `call_site`.
pub fn enumerate_and_report<T: Trace>(
    trace: &T,
    call_site: &CallSite,
    reporter: &dyn IssueReporter<T>,
) {
    let is_endpoint = |source: &T::Source| -> bool {
        source
            .declaring_class_or_none()
            .map(config::is_endpoint_class)
            .unwrap_or(false)
    };
    for path in trace.get_reportable_paths(&is_endpoint) {
        reporter.report(call_site, &path);
    }
}

/// Small adapter so the closure above reads naturally; `FootprintAware`
/// already carries `declaring_class`, this just gives it a owned-string
/// shorthand at the call site.
trait DeclaringClassOrNone {
    fn declaring_class_or_none(&self) -> Option<&str>;
}

impl<S: crate::features::taint_analysis::domain::FootprintAware> DeclaringClassOrNone for S {
    fn declaring_class_or_none(&self) -> Option<&str> {
        self.declaring_class()
    }
}
