// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use tracing::debug;

struct LineageStep {
    depth: u32,
    kind: Rc<str>,
    args: Option<Vec<Rc<str>>>,
}

/// Ancestor-chain pattern deciding whether a context-sensitive statement
/// takes effect where it appears.
///
/// A pattern is an ordered list of steps at strictly ascending ancestor
/// depths (1 = parent). Each step names the statement kind required at that
/// depth and, optionally, the raw argument values accepted there.
/// [`LineagePattern::matches`] walks the chain once; a mismatch is logged
/// and makes the whole pattern false. It is never an error: a false result
/// excludes the context from the effective model silently.
pub struct LineagePattern {
    steps: Vec<LineageStep>,
}

impl LineagePattern {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Require the ancestor `depth` levels up to be of `kind`.
    pub fn step(mut self, depth: u32, kind: &str) -> Self {
        self.push(depth, kind, None);
        self
    }

    /// Require the ancestor `depth` levels up to be of `kind` with a raw
    /// argument among `args`.
    pub fn step_with_args(mut self, depth: u32, kind: &str, args: &[&str]) -> Self {
        self.push(depth, kind, Some(args.iter().map(|a| (*a).into()).collect()));
        self
    }

    fn push(&mut self, depth: u32, kind: &str, args: Option<Vec<Rc<str>>>) {
        assert!(
            depth > self.steps.last().map_or(0, |s| s.depth),
            "lineage steps must have strictly ascending depths"
        );
        self.steps.push(LineageStep {
            depth,
            kind: kind.into(),
            args,
        });
    }

    /// Evaluate the pattern against the lineage of `id`.
    pub fn matches(&self, tree: &StatementTree, id: StatementId) -> bool {
        let mut current = id;
        let mut at_depth = 0u32;

        for step in &self.steps {
            while at_depth < step.depth {
                current = match tree.parent(current) {
                    Some(parent) => parent,
                    None => {
                        debug!(
                            "'{}' has no ancestor at depth {}, required kind '{}'",
                            tree.kind(id),
                            step.depth,
                            step.kind
                        );
                        return false;
                    }
                };
                at_depth += 1;
            }

            let kind = tree.kind(current);
            if *kind != step.kind {
                debug!(
                    "ancestor of '{}' at depth {} is '{}', required '{}'",
                    tree.kind(id),
                    step.depth,
                    kind,
                    step.kind
                );
                return false;
            }

            if let Some(accepted) = &step.args {
                let argument = tree.argument(current);
                if !argument.is_some_and(|arg| accepted.contains(arg)) {
                    debug!(
                        "ancestor '{}' of '{}' has argument {:?}, accepted {:?}",
                        step.kind,
                        tree.kind(id),
                        argument,
                        accepted
                    );
                    return false;
                }
            }
        }

        true
    }
}

impl Default for LineagePattern {
    fn default() -> Self {
        Self::new()
    }
}

/// Lineage required of `get-filter-element-attributes` (RFC 6241): an
/// `anyxml "filter"` inside the `input` of the `get` or `get-config` rpc.
pub fn get_filter_lineage() -> LineagePattern {
    LineagePattern::new()
        .step_with_args(1, "anyxml", &["filter"])
        .step(2, "input")
        .step_with_args(3, "rpc", &["get", "get-config"])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::source::Source;

    fn span() -> Span {
        let src = Source::from_contents("test.yang".to_string(), "module".to_string()).unwrap();
        src.span_at(0, 6)
    }

    fn filter_tree(rpc_name: &str, input_kind: &str, anyxml_kind: &str, anyxml_name: &str) -> (StatementTree, StatementId) {
        let mut t = StatementTree::new("module", Some("test"), "urn:example:test", span());
        let rpc = t.append(t.root(), "rpc", Some(rpc_name), span());
        let input = t.append(rpc, input_kind, None, span());
        let anyxml = t.append(input, anyxml_kind, Some(anyxml_name), span());
        let ext = t.append(anyxml, "get-filter-element-attributes", None, span());
        (t, ext)
    }

    #[test]
    fn test_get_filter_lineage_matches() {
        let (t, ext) = filter_tree("get", "input", "anyxml", "filter");
        assert!(get_filter_lineage().matches(&t, ext));

        let (t, ext) = filter_tree("get-config", "input", "anyxml", "filter");
        assert!(get_filter_lineage().matches(&t, ext));
    }

    #[test]
    fn test_get_filter_lineage_rejects_mutations() {
        // rpc argument outside the accepted set
        let (t, ext) = filter_tree("edit-config", "input", "anyxml", "filter");
        assert!(!get_filter_lineage().matches(&t, ext));

        // grandparent is not an input statement
        let (t, ext) = filter_tree("get", "output", "anyxml", "filter");
        assert!(!get_filter_lineage().matches(&t, ext));

        // parent is not an anyxml
        let (t, ext) = filter_tree("get", "input", "container", "filter");
        assert!(!get_filter_lineage().matches(&t, ext));

        // anyxml is not the filter element
        let (t, ext) = filter_tree("get", "input", "anyxml", "payload");
        assert!(!get_filter_lineage().matches(&t, ext));
    }

    #[test]
    fn test_missing_ancestor_fails() {
        let mut t = StatementTree::new("module", Some("test"), "urn:example:test", span());
        let anyxml = t.append(t.root(), "anyxml", Some("filter"), span());
        let ext = t.append(anyxml, "get-filter-element-attributes", None, span());
        // Depth 2 reaches the module root, which is not an input.
        assert!(!get_filter_lineage().matches(&t, ext));
    }

    #[test]
    fn test_empty_pattern_always_matches() {
        let (t, ext) = filter_tree("edit-config", "output", "container", "x");
        assert!(LineagePattern::new().matches(&t, ext));
    }

    #[test]
    #[should_panic(expected = "ascending")]
    fn test_steps_must_ascend() {
        let _ = LineagePattern::new().step(2, "input").step(1, "anyxml");
    }
}
