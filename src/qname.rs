// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use core::fmt::{self, Debug, Display, Formatter};

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// True if `s` is a valid statement identifier: a letter or underscore
/// followed by letters, digits, underscores, dots or hyphens.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Namespace-qualified name of a schema node or statement kind.
///
/// Cheap to clone; both components are shared strings.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    namespace: Rc<str>,
    local_name: Rc<str>,
}

impl QName {
    pub fn new(namespace: Rc<str>, local_name: Rc<str>) -> Self {
        Self {
            namespace,
            local_name,
        }
    }

    pub fn namespace(&self) -> &Rc<str> {
        &self.namespace
    }

    pub fn local_name(&self) -> &Rc<str> {
        &self.local_name
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.namespace, self.local_name)
    }
}

impl Debug for QName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for QName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("QName", 2)?;
        s.serialize_field("namespace", self.namespace.as_ref())?;
        s.serialize_field("local-name", self.local_name.as_ref())?;
        s.end()
    }
}

#[derive(PartialEq, Eq, Hash)]
struct PathNode {
    parent: Option<Rc<PathNode>>,
    qname: QName,
    len: u32,
}

/// Absolute path of a schema node: the sequence of qualified names from the
/// model root down to the node.
///
/// Paths share structure: a child path holds its parent path plus one
/// component, so deriving a child is O(1) and never copies the prefix.
/// Equality is structural over the full component sequence.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    inner: Option<Rc<PathNode>>,
}

impl SchemaPath {
    /// The empty path of the model root.
    pub fn root() -> Self {
        Self { inner: None }
    }

    /// Path of a child node: this path extended with `qname`.
    pub fn child(&self, qname: QName) -> Self {
        let len = self.len() as u32 + 1;
        Self {
            inner: Some(Rc::new(PathNode {
                parent: self.inner.clone(),
                qname,
                len,
            })),
        }
    }

    pub fn parent(&self) -> Option<SchemaPath> {
        self.inner.as_ref().map(|node| SchemaPath {
            inner: node.parent.clone(),
        })
    }

    /// Final component, `None` for the root path.
    pub fn last(&self) -> Option<&QName> {
        self.inner.as_ref().map(|node| &node.qname)
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            Some(node) => node.len as usize,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Components in root-first order.
    pub fn iter(&self) -> impl Iterator<Item = &QName> {
        let mut components = Vec::with_capacity(self.len());
        let mut current = self.inner.as_deref();
        while let Some(node) = current {
            components.push(&node.qname);
            current = node.parent.as_deref();
        }
        components.into_iter().rev()
    }
}

impl Display for SchemaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }
        for qname in self.iter() {
            write!(f, "/{qname}")?;
        }
        Ok(())
    }
}

impl Debug for SchemaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for SchemaPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

/// Version of the schema language a module is written in.
///
/// Version 1.1 (RFC 7950) allows `if-feature` under `enum` and `bit`,
/// which is what gates the default-value audit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YangVersion {
    #[default]
    V1,
    V1_1,
}

impl YangVersion {
    /// Parse a `yang-version` argument.
    pub fn parse(s: &str) -> Option<YangVersion> {
        match s {
            "1" => Some(YangVersion::V1),
            "1.1" => Some(YangVersion::V1_1),
            _ => None,
        }
    }
}

impl Display for YangVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            YangVersion::V1 => f.write_str("1"),
            YangVersion::V1_1 => f.write_str("1.1"),
        }
    }
}

impl Serialize for YangVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
