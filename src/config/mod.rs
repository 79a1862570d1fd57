//! Endpoint-class configuration.
//!
//! The only configuration the core recognizes (§6): a JSON list of fully
//! qualified class names that are externally callable entry points. A
//! source declared on one of these classes gets an "endpoint" annotation
//! in its report text (§4.6). The set is loaded once, lazily, and is
//! read-only for the remainder of the process.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;
use std::path::Path;

use crate::errors::{CodegraphError, Result};

static ENDPOINT_CLASSES: OnceCell<FxHashSet<String>> = OnceCell::new();

/// Parses an endpoint-class list (as loaded from the configured JSON file)
/// into a set.
fn parse_endpoint_classes(json: &str) -> Result<FxHashSet<String>> {
    let names: Vec<String> = serde_json::from_str(json)
        .map_err(|e| CodegraphError::config(format!("invalid endpoint-class list: {e}")))?;
    Ok(names.into_iter().collect())
}

/// Loads the endpoint-class set from disk and installs it as the
/// process-wide set, if one has not already been installed.
///
/// Only the first call for a given process has any effect; subsequent
/// calls (even with a different path) are no-ops, matching the "read-only
/// thereafter" resource model in §5.
pub fn load_endpoint_classes_from_file(path: impl AsRef<Path>) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    let set = parse_endpoint_classes(&contents)?;
    let _ = ENDPOINT_CLASSES.set(set);
    Ok(())
}

/// Returns `true` if `class_name` is configured as an endpoint class.
///
/// If no configuration has been loaded yet, the set is materialized as
/// empty on first use: an unconfigured core reports no endpoints, it
/// never fails a report because of missing configuration.
pub fn is_endpoint_class(class_name: &str) -> bool {
    ENDPOINT_CLASSES
        .get_or_init(FxHashSet::default)
        .contains(class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_json_list_of_class_names() {
        let set = parse_endpoint_classes(r#"["com.example.Controller", "com.example.Api"]"#)
            .unwrap();
        assert!(set.contains("com.example.Controller"));
        assert!(set.contains("com.example.Api"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_endpoint_classes("not json").is_err());
    }

    #[test]
    fn unconfigured_lookup_returns_false_without_panicking() {
        // This test shares process-wide state with every other test that
        // touches ENDPOINT_CLASSES; it only asserts the call doesn't panic.
        let _ = is_endpoint_class("anything");
    }
}
