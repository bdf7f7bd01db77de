// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Checks whether any of a leaf's default values names an enum or bit
//! that is gated behind an if-feature guard. Such defaults are only a
//! concern from language version 1.1 on, and only for types that carry
//! labelled members.

use crate::*;
use std::collections::BTreeSet;

type String = Rc<str>;

/// Returns true when one of `default_values` names an if-feature guarded
/// member of `type_statement`.
///
/// `default_values` is consumed destructively: every member label that
/// matches a candidate removes it from the set, guarded or not, and the
/// scan stops as soon as the set drains. Callers that need the set again
/// must pass a copy.
pub fn has_guarded_default(
    version: YangVersion,
    type_statement: &EffectiveStatement,
    default_values: &mut BTreeSet<String>,
) -> bool {
    !default_values.is_empty()
        && is_relevant(version, type_statement)
        && any_default_guarded(type_statement, default_values)
}

/// Single-candidate form of [`has_guarded_default`]. An empty default
/// value is never reported as guarded.
pub fn has_guarded_default_value(
    version: YangVersion,
    type_statement: &EffectiveStatement,
    default_value: &str,
) -> bool {
    if default_value.is_empty() {
        return false;
    }
    let mut values = BTreeSet::new();
    values.insert(default_value.into());
    has_guarded_default(version, type_statement, &mut values)
}

/// Only version 1.1 admits if-feature under enum and bit, and only
/// enumeration, bits and union types have members to guard.
fn is_relevant(version: YangVersion, type_statement: &EffectiveStatement) -> bool {
    if version != YangVersion::V1_1 {
        return false;
    }
    matches!(
        type_statement.node_parameter().map(|p| p.as_ref()),
        Some("enumeration" | "bits" | "union")
    )
}

fn any_default_guarded(
    type_statement: &EffectiveStatement,
    default_values: &mut BTreeSet<String>,
) -> bool {
    for substatement in type_statement.substatements() {
        if default_values.is_empty() {
            break;
        }
        let node_type = substatement.node_type();
        if node_type.namespace().as_ref() != YIN_NAMESPACE {
            continue;
        }
        match node_type.local_name().as_ref() {
            "enum" | "bit" => {
                if let Some(label) = substatement.node_parameter() {
                    if default_values.remove(label.as_ref()) && contains_if_feature(substatement) {
                        return true;
                    }
                }
            }
            // Union members recurse over the same shrinking candidate set.
            "type" => {
                if any_default_guarded(substatement, default_values) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn contains_if_feature(statement: &EffectiveStatement) -> bool {
    statement.substatements().iter().any(|sub| {
        sub.node_type().namespace().as_ref() == YIN_NAMESPACE
            && sub.node_type().local_name().as_ref() == "if-feature"
    })
}
