// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use core::fmt::{self, Debug, Formatter};
use std::collections::BTreeMap;

/// Index of a statement context within its [`StatementTree`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(u32);

impl StatementId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for StatementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "stmt#{}", self.0)
    }
}

/// Inference phase a statement context has completed.
///
/// Phases only advance, and a whole tree moves through them together: every
/// context reaches a phase before any context enters the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Constructed, kind not yet bound to a support
    Init,
    /// Kind bound to its registered support
    DefinitionResolved,
    /// Declared form built, substatements validated, supported flag settled
    FullyDeclared,
    /// Effective statement materialized (or context dropped as unsupported)
    EffectiveModel,
}

/// Immutable declared form of one statement: what the source said, before
/// inference. Shared between the context and its effective statement.
pub struct DeclaredStatement {
    kind: Rc<str>,
    argument: Option<Rc<str>>,
    substatements: Vec<Rc<DeclaredStatement>>,
    span: Span,
}

impl DeclaredStatement {
    pub(crate) fn new(
        kind: Rc<str>,
        argument: Option<Rc<str>>,
        substatements: Vec<Rc<DeclaredStatement>>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            argument,
            substatements,
            span,
        }
    }

    pub fn kind(&self) -> &Rc<str> {
        &self.kind
    }

    pub fn argument(&self) -> Option<&Rc<str>> {
        self.argument.as_ref()
    }

    pub fn substatements(&self) -> &[Rc<DeclaredStatement>] {
        &self.substatements
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Debug for DeclaredStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "{} {:?}", self.kind, arg),
            None => write!(f, "{}", self.kind),
        }
    }
}

pub(crate) struct StatementNode {
    pub(crate) kind: Rc<str>,
    pub(crate) argument: Option<Rc<str>>,
    pub(crate) span: Span,
    pub(crate) parent: Option<StatementId>,
    pub(crate) children: Vec<StatementId>,
    pub(crate) phase: Phase,
    pub(crate) supported: bool,
    pub(crate) original: Option<StatementId>,
    pub(crate) qname: Option<QName>,
    pub(crate) path: Option<SchemaPath>,
    pub(crate) support: Option<Rc<StatementSupport>>,
    pub(crate) declared: Option<Rc<DeclaredStatement>>,
    pub(crate) effective: Option<Rc<EffectiveStatement>>,
}

/// One compilation unit: the raw statement tree of a module, stored as an
/// arena indexed by [`StatementId`].
///
/// The front end appends statements top-down, so a parent's id is always
/// smaller than the ids of its descendants.
pub struct StatementTree {
    nodes: Vec<StatementNode>,
    namespace: Rc<str>,
    prefixes: BTreeMap<Rc<str>, Rc<str>>,
}

impl StatementTree {
    /// Start a tree from its root statement (normally `module`). The
    /// namespace is the one the module declares; argument-level prefix
    /// resolution uses it as the fallback.
    pub fn new(kind: &str, argument: Option<&str>, namespace: &str, span: Span) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            namespace: namespace.into(),
            prefixes: BTreeMap::new(),
        };
        tree.push(kind, argument, span, None);
        tree
    }

    /// Append a statement under `parent`. Substatement order is the order
    /// of appends.
    pub fn append(
        &mut self,
        parent: StatementId,
        kind: &str,
        argument: Option<&str>,
        span: Span,
    ) -> StatementId {
        let id = self.push(kind, argument, span, Some(parent));
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn push(
        &mut self,
        kind: &str,
        argument: Option<&str>,
        span: Span,
        parent: Option<StatementId>,
    ) -> StatementId {
        let id = StatementId(self.nodes.len() as u32);
        self.nodes.push(StatementNode {
            kind: kind.into(),
            argument: argument.map(Into::into),
            span,
            parent,
            children: Vec::new(),
            phase: Phase::Init,
            supported: true,
            original: None,
            qname: None,
            path: None,
            support: None,
            declared: None,
            effective: None,
        });
        id
    }

    /// Record a prefix the module may use in qualified arguments.
    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Link a context to the context it was copied from. Identity
    /// resolution reuses the original's qualified name when its effective
    /// statement has already been built.
    pub fn set_original(&mut self, id: StatementId, original: StatementId) {
        self.nodes[id.index()].original = Some(original);
    }

    pub fn root(&self) -> StatementId {
        StatementId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in append order: parents before their descendants.
    pub fn ids(&self) -> impl Iterator<Item = StatementId> {
        (0..self.nodes.len() as u32).map(StatementId)
    }

    pub fn namespace(&self) -> &Rc<str> {
        &self.namespace
    }

    pub fn prefix_namespace(&self, prefix: &str) -> Option<&Rc<str>> {
        self.prefixes.get(prefix)
    }

    pub fn kind(&self, id: StatementId) -> &Rc<str> {
        &self.nodes[id.index()].kind
    }

    pub fn argument(&self, id: StatementId) -> Option<&Rc<str>> {
        self.nodes[id.index()].argument.as_ref()
    }

    pub fn span(&self, id: StatementId) -> &Span {
        &self.nodes[id.index()].span
    }

    pub fn parent(&self, id: StatementId) -> Option<StatementId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: StatementId) -> &[StatementId] {
        &self.nodes[id.index()].children
    }

    pub fn phase(&self, id: StatementId) -> Phase {
        self.nodes[id.index()].phase
    }

    /// False once ancestor-chain validation has excluded this context.
    pub fn is_supported(&self, id: StatementId) -> bool {
        self.nodes[id.index()].supported
    }

    pub fn qname(&self, id: StatementId) -> Option<&QName> {
        self.nodes[id.index()].qname.as_ref()
    }

    pub fn path(&self, id: StatementId) -> Option<&SchemaPath> {
        self.nodes[id.index()].path.as_ref()
    }

    pub fn declared(&self, id: StatementId) -> Option<&Rc<DeclaredStatement>> {
        self.nodes[id.index()].declared.as_ref()
    }

    pub fn effective(&self, id: StatementId) -> Option<&Rc<EffectiveStatement>> {
        self.nodes[id.index()].effective.as_ref()
    }

    pub(crate) fn node(&self, id: StatementId) -> &StatementNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: StatementId) -> &mut StatementNode {
        &mut self.nodes[id.index()]
    }
}
