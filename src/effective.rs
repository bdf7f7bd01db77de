// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Kind-specific resolved payload of an effective statement.
#[derive(Clone, Debug)]
pub enum EffectiveValue {
    None,
    /// Resolved `range`/`length` constraint set, ascending and disjoint.
    Ranges(Rc<Vec<ValueRange>>),
}

/// Inputs an effective factory receives: the context, its resolved
/// identity, its declared form and the already-built child effectives.
pub struct EffectiveInputs<'a> {
    pub tree: &'a StatementTree,
    pub id: StatementId,
    pub qname: Option<QName>,
    pub path: SchemaPath,
    pub node_type: QName,
    pub declared: Rc<DeclaredStatement>,
    pub substatements: Vec<Rc<EffectiveStatement>>,
}

/// One node of the effective model.
///
/// Immutable once built. Equality and hashing cover the statement's
/// identity: qualified name, path, node type and raw parameter.
/// Substatements and resolved payload are excluded, so re-expanded copies
/// of a statement group compare equal to their originals.
pub struct EffectiveStatement {
    qname: Option<QName>,
    path: SchemaPath,
    node_type: QName,
    node_parameter: Option<Rc<str>>,
    value: EffectiveValue,
    substatements: Vec<Rc<EffectiveStatement>>,
    declared: Rc<DeclaredStatement>,
}

impl EffectiveStatement {
    pub fn new(inputs: EffectiveInputs<'_>, value: EffectiveValue) -> Self {
        let node_parameter = inputs.tree.argument(inputs.id).cloned();
        Self {
            qname: inputs.qname,
            path: inputs.path,
            node_type: inputs.node_type,
            node_parameter,
            value,
            substatements: inputs.substatements,
            declared: inputs.declared,
        }
    }

    /// Qualified name this statement resolved to. `None` only for the
    /// model root.
    pub fn qname(&self) -> Option<&QName> {
        self.qname.as_ref()
    }

    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// Qualified name of the statement's kind.
    pub fn node_type(&self) -> &QName {
        &self.node_type
    }

    /// Raw argument text, if the statement carried one.
    pub fn node_parameter(&self) -> Option<&Rc<str>> {
        self.node_parameter.as_ref()
    }

    pub fn value(&self) -> &EffectiveValue {
        &self.value
    }

    /// Resolved constraint set, for `range`/`length` statements.
    pub fn ranges(&self) -> Option<&[ValueRange]> {
        match &self.value {
            EffectiveValue::Ranges(ranges) => Some(ranges),
            EffectiveValue::None => None,
        }
    }

    pub fn substatements(&self) -> &[Rc<EffectiveStatement>] {
        &self.substatements
    }

    /// Declared form this statement was built from.
    pub fn declared(&self) -> &Rc<DeclaredStatement> {
        &self.declared
    }

    /// First substatement of the given kind, e.g. to find an extension
    /// attached to a node.
    pub fn find_substatement(&self, node_type: &QName) -> Option<&Rc<EffectiveStatement>> {
        self.substatements
            .iter()
            .find(|sub| sub.node_type == *node_type)
    }
}

impl PartialEq for EffectiveStatement {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.path == other.path
            && self.node_type == other.node_type
            && self.node_parameter == other.node_parameter
    }
}

impl Eq for EffectiveStatement {}

impl Hash for EffectiveStatement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qname.hash(state);
        self.path.hash(state);
        self.node_type.hash(state);
        self.node_parameter.hash(state);
    }
}

impl Debug for EffectiveStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.node_parameter {
            Some(parameter) => write!(f, "{} {:?} at {}", self.node_type, parameter, self.path),
            None => write!(f, "{} at {}", self.node_type, self.path),
        }
    }
}

impl Serialize for EffectiveStatement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 1;
        if self.qname.is_some() {
            len += 1;
        }
        if self.node_parameter.is_some() {
            len += 1;
        }
        if matches!(self.value, EffectiveValue::Ranges(_)) {
            len += 1;
        }
        if !self.substatements.is_empty() {
            len += 1;
        }

        let mut s = serializer.serialize_struct("EffectiveStatement", len)?;
        s.serialize_field("node-type", &self.node_type)?;
        if let Some(qname) = &self.qname {
            s.serialize_field("qname", qname)?;
        }
        if let Some(parameter) = &self.node_parameter {
            s.serialize_field("parameter", parameter.as_ref())?;
        }
        if let EffectiveValue::Ranges(ranges) = &self.value {
            s.serialize_field("ranges", ranges.as_ref())?;
        }
        if !self.substatements.is_empty() {
            s.serialize_field("substatements", &self.substatements)?;
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::source::Source;
    use std::collections::HashSet;

    fn span() -> Span {
        let src = Source::from_contents("test.yang".to_string(), "module".to_string()).unwrap();
        src.span_at(0, 6)
    }

    fn qname(local: &str) -> QName {
        QName::new("urn:example:test".into(), local.into())
    }

    fn statement(
        argument: Option<&str>,
        substatements: Vec<Rc<EffectiveStatement>>,
    ) -> EffectiveStatement {
        let tree = StatementTree::new("leaf", argument, "urn:example:test", span());
        let declared = Rc::new(DeclaredStatement::new(
            "leaf".into(),
            argument.map(Into::into),
            Vec::new(),
            span(),
        ));
        let inputs = EffectiveInputs {
            tree: &tree,
            id: tree.root(),
            qname: argument.map(qname),
            path: SchemaPath::root().child(qname(argument.unwrap_or("leaf"))),
            node_type: QName::new(crate::support::YIN_NAMESPACE.into(), "leaf".into()),
            declared,
            substatements,
        };
        EffectiveStatement::new(inputs, EffectiveValue::None)
    }

    #[test]
    fn test_equality_covers_identity_only() {
        let plain = statement(Some("counter"), Vec::new());
        let with_child = statement(
            Some("counter"),
            vec![Rc::new(statement(Some("other"), Vec::new()))],
        );
        // Same identity, different substatements: still equal.
        assert_eq!(plain, with_child);

        let renamed = statement(Some("gauge"), Vec::new());
        assert_ne!(plain, renamed);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(set.contains(&with_child));
    }

    #[test]
    fn test_find_substatement() {
        let child = Rc::new(statement(Some("inner"), Vec::new()));
        let parent = statement(Some("outer"), vec![child.clone()]);

        let leaf_type = QName::new(crate::support::YIN_NAMESPACE.into(), "leaf".into());
        assert_eq!(parent.find_substatement(&leaf_type), Some(&child));
        assert!(parent.find_substatement(&qname("missing")).is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let stmt = statement(Some("counter"), Vec::new());
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["node-type"]["local-name"], "leaf");
        assert_eq!(json["parameter"], "counter");
        assert_eq!(json["qname"]["namespace"], "urn:example:test");
        assert!(json.get("substatements").is_none());
        assert!(json.get("ranges").is_none());
    }
}
