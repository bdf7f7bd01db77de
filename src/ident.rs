// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;

/// Parse a statement argument as a qualified name.
///
/// `prefix:name` resolves the prefix against the tree's prefix map; a bare
/// identifier falls into the module's own namespace. Returns `None` for
/// anything else: free-text arguments, unknown prefixes, malformed
/// identifiers. Callers fall back to the statement kind's own name.
pub fn qname_from_argument(tree: &StatementTree, argument: &str) -> Option<QName> {
    match argument.split_once(':') {
        None => {
            if is_identifier(argument) {
                Some(QName::new(tree.namespace().clone(), argument.into()))
            } else {
                None
            }
        }
        Some((prefix, local)) => {
            if !is_identifier(prefix) || !is_identifier(local) {
                return None;
            }
            let namespace = tree.prefix_namespace(prefix)?;
            Some(QName::new(namespace.clone(), local.into()))
        }
    }
}

/// Derive and stamp `(qname, path)` for one context.
///
/// The parent's path must already be resolved; the effective build invokes
/// this top-down. The root context gets the empty path and no name.
pub(crate) fn resolve_identity(tree: &mut StatementTree, id: StatementId) -> Result<()> {
    let parent = match tree.parent(id) {
        Some(parent) => parent,
        None => {
            tree.node_mut(id).path = Some(SchemaPath::root());
            return Ok(());
        }
    };

    let parent_path = match tree.path(parent) {
        Some(path) => path.clone(),
        None => {
            let node = tree.node(id);
            return Err(Error::MissingParentPath {
                keyword: node.kind.clone(),
                span: node.span.clone(),
            });
        }
    };

    let qname = derive_qname(tree, id, &parent_path);
    let path = parent_path.child(qname.clone());

    let node = tree.node_mut(id);
    node.qname = Some(qname);
    node.path = Some(path);
    Ok(())
}

fn derive_qname(tree: &StatementTree, id: StatementId, parent_path: &SchemaPath) -> QName {
    // A context copied out of a reusable group keeps the name its original
    // resolved to, as long as the original has been built.
    if let Some(original) = tree.node(id).original {
        if let Some(effective) = tree.effective(original) {
            if let Some(qname) = effective.qname() {
                return qname.clone();
            }
        }
    }

    let node = tree.node(id);
    let def = node.support.as_ref().map(|s| s.def());

    let kind_name = match def {
        Some(def) => def.qname().local_name().clone(),
        None => node.kind.clone(),
    };

    if matches!(def.map(StatementDef::argument), Some(ArgumentPolicy::Forbidden)) {
        // Void-argument statements are named after their kind, in the
        // namespace of the parent's last path component.
        let namespace = match parent_path.last() {
            Some(last) => last.namespace().clone(),
            None => tree.namespace().clone(),
        };
        return QName::new(namespace, kind_name);
    }

    let fallback = match def {
        Some(def) => def.qname().clone(),
        None => QName::new(tree.namespace().clone(), kind_name),
    };

    match &node.argument {
        Some(argument) => qname_from_argument(tree, argument).unwrap_or(fallback),
        None => fallback,
    }
}
