// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ident::resolve_identity;
use crate::*;
use serde::Serialize;
use tracing::debug;

/// Drives a statement tree through the inference phases and produces the
/// effective model.
///
/// Phases run as whole-tree sweeps: definition resolution binds every kind
/// to its support, full declaration builds declared forms bottom-up while
/// validating substatements and settling supported flags, and the
/// effective sweep resolves identities top-down and materializes effective
/// statements bottom-up. A later sweep never starts before the previous
/// one has finished the entire tree.
pub struct ModelBuilder {
    registry: Rc<SupportRegistry>,
    permit_unknown: bool,
}

impl ModelBuilder {
    /// Builder over the default registry.
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    pub fn with_registry(registry: Rc<SupportRegistry>) -> Self {
        Self {
            registry,
            permit_unknown: false,
        }
    }

    /// Treat unregistered statement kinds as opaque unknown statements
    /// instead of failing the build.
    pub fn permit_unknown(mut self) -> Self {
        self.permit_unknown = true;
        self
    }

    /// Resolve `tree` into its effective model. Fatal errors abort the
    /// whole unit; no partial model is returned.
    pub fn build(&self, tree: &mut StatementTree) -> Result<EffectiveModel> {
        self.resolve_definitions(tree)?;
        self.declare(tree, tree.root())?;
        let version = resolve_version(tree)?;

        match self.materialize(tree, tree.root())? {
            Some(root) => Ok(EffectiveModel { root, version }),
            None => {
                let root = tree.root();
                Err(Error::SubstatementValidation {
                    detail: format!(
                        "root statement '{}' was excluded from the effective model",
                        tree.kind(root)
                    )
                    .into(),
                    span: tree.span(root).clone(),
                })
            }
        }
    }

    fn resolve_definitions(&self, tree: &mut StatementTree) -> Result<()> {
        for id in tree.ids() {
            debug_assert_eq!(tree.phase(id), Phase::Init);
            let support = match self.registry.lookup(tree.kind(id)) {
                Some(support) => support,
                None if self.permit_unknown => Rc::new(unknown_support(tree, id)),
                None => {
                    return Err(Error::UnknownStatementKind {
                        keyword: tree.kind(id).clone(),
                        span: tree.span(id).clone(),
                    });
                }
            };
            let node = tree.node_mut(id);
            node.support = Some(support);
            node.phase = Phase::DefinitionResolved;
        }
        Ok(())
    }

    fn declare(&self, tree: &mut StatementTree, id: StatementId) -> Result<Rc<DeclaredStatement>> {
        debug_assert_eq!(tree.phase(id), Phase::DefinitionResolved);

        let children = tree.children(id).to_vec();
        let mut substatements = Vec::with_capacity(children.len());
        for child in children {
            substatements.push(self.declare(tree, child)?);
        }

        let support = bound_support(tree, id)?;
        support.validate(tree, id)?;
        let declared = Rc::new(support.make_declared(tree, id, substatements));
        tree.node_mut(id).declared = Some(declared.clone());

        if let Some(pattern) = support.applicability() {
            let supported = pattern.matches(tree, id);
            if !supported {
                debug!(
                    "'{}' does not apply in its lineage; excluding it from the effective model",
                    tree.kind(id)
                );
            }
            tree.node_mut(id).supported = supported;
        }

        tree.node_mut(id).phase = Phase::FullyDeclared;
        Ok(declared)
    }

    fn materialize(
        &self,
        tree: &mut StatementTree,
        id: StatementId,
    ) -> Result<Option<Rc<EffectiveStatement>>> {
        debug_assert_eq!(tree.phase(id), Phase::FullyDeclared);

        if !tree.is_supported(id) {
            debug!("'{}' is excluded from the effective model", tree.kind(id));
            mark_resolved(tree, id);
            return Ok(None);
        }

        resolve_identity(tree, id)?;

        let children = tree.children(id).to_vec();
        let mut substatements = Vec::with_capacity(children.len());
        for child in children {
            if let Some(effective) = self.materialize(tree, child)? {
                substatements.push(effective);
            }
        }

        let support = bound_support(tree, id)?;
        let declared = bound_declared(tree, id)?;
        let inputs = EffectiveInputs {
            tree,
            id,
            qname: tree.qname(id).cloned(),
            path: tree.path(id).cloned().unwrap_or_else(SchemaPath::root),
            node_type: support.def().qname().clone(),
            declared,
            substatements,
        };
        let effective = Rc::new(support.make_effective(inputs)?);

        let node = tree.node_mut(id);
        node.effective = Some(effective.clone());
        node.phase = Phase::EffectiveModel;
        Ok(Some(effective))
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn bound_support(tree: &StatementTree, id: StatementId) -> Result<Rc<StatementSupport>> {
    match &tree.node(id).support {
        Some(support) => Ok(support.clone()),
        None => Err(Error::UnknownStatementKind {
            keyword: tree.kind(id).clone(),
            span: tree.span(id).clone(),
        }),
    }
}

/// Declared form recorded for this context during full declaration. A
/// parent's declared substatements need not mirror its children; each
/// context keeps its own form.
fn bound_declared(tree: &StatementTree, id: StatementId) -> Result<Rc<DeclaredStatement>> {
    match &tree.node(id).declared {
        Some(declared) => Ok(declared.clone()),
        None => Err(Error::SubstatementValidation {
            detail: format!("statement '{}' has no declared form", tree.kind(id)).into(),
            span: tree.span(id).clone(),
        }),
    }
}

/// Support synthesized for an unregistered kind under passthrough: an
/// opaque statement admitting any substatements, named through the prefix
/// map when the keyword is prefixed.
fn unknown_support(tree: &StatementTree, id: StatementId) -> StatementSupport {
    let keyword = tree.kind(id);
    let qname = match keyword.split_once(':') {
        Some((prefix, local)) if is_identifier(prefix) && is_identifier(local) => {
            match tree.prefix_namespace(prefix) {
                Some(namespace) => QName::new(namespace.clone(), local.into()),
                None => QName::new(tree.namespace().clone(), local.into()),
            }
        }
        _ => QName::new(tree.namespace().clone(), keyword.clone()),
    };
    let argument = match tree.argument(id) {
        Some(_) => ArgumentPolicy::Required,
        None => ArgumentPolicy::Forbidden,
    };
    StatementSupport::new(
        StatementDef::new(keyword, qname, argument),
        SubstatementValidator::any(),
    )
}

/// Tag an excluded subtree as resolved, children first.
fn mark_resolved(tree: &mut StatementTree, id: StatementId) {
    for child in tree.children(id).to_vec() {
        mark_resolved(tree, child);
    }
    tree.node_mut(id).phase = Phase::EffectiveModel;
}

fn resolve_version(tree: &StatementTree) -> Result<YangVersion> {
    for &child in tree.children(tree.root()) {
        if tree.kind(child).as_ref() != "yang-version" {
            continue;
        }
        let text = tree.argument(child).map(|a| a.as_ref()).unwrap_or("");
        return YangVersion::parse(text).ok_or_else(|| Error::SubstatementValidation {
            detail: format!("'{text}' is not a valid yang-version").into(),
            span: tree.span(child).clone(),
        });
    }
    Ok(YangVersion::default())
}

/// Result of a successful build: the immutable effective statement tree
/// and the language version the module declared.
#[derive(Debug, Serialize)]
pub struct EffectiveModel {
    root: Rc<EffectiveStatement>,
    version: YangVersion,
}

impl EffectiveModel {
    pub fn root(&self) -> &Rc<EffectiveStatement> {
        &self.root
    }

    pub fn version(&self) -> YangVersion {
        self.version
    }

    pub fn to_json_str(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
