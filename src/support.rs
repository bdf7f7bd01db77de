// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use dashmap::DashMap;
use std::collections::BTreeMap;

type String = Rc<str>;

/// Namespace of the core statement vocabulary.
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";
/// Namespace of the base NETCONF extensions (RFC 6241).
pub const NETCONF_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Whether a statement kind carries an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentPolicy {
    Required,
    Forbidden,
}

/// Identity of a statement kind: its keyword, its qualified name, and its
/// argument policy.
#[derive(Clone, Debug)]
pub struct StatementDef {
    keyword: String,
    qname: QName,
    argument: ArgumentPolicy,
}

impl StatementDef {
    pub fn new(keyword: &str, qname: QName, argument: ArgumentPolicy) -> Self {
        Self {
            keyword: keyword.into(),
            qname,
            argument,
        }
    }

    /// Core-vocabulary definition: qualified name in the YIN namespace.
    pub fn core(keyword: &str, argument: ArgumentPolicy) -> Self {
        Self::new(
            keyword,
            QName::new(YIN_NAMESPACE.into(), keyword.into()),
            argument,
        )
    }

    pub fn keyword(&self) -> &String {
        &self.keyword
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn argument(&self) -> ArgumentPolicy {
        self.argument
    }
}

/// Allowed occurrence count of one substatement kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cardinality {
    min: u32,
    max: u32,
}

impl Cardinality {
    pub const OPTIONAL: Cardinality = Cardinality { min: 0, max: 1 };
    pub const MANDATORY: Cardinality = Cardinality { min: 1, max: 1 };
    pub const MULTIPLE: Cardinality = Cardinality {
        min: 0,
        max: u32::MAX,
    };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Cardinality table for the substatements a kind admits.
///
/// Kinds missing from the table are rejected, except statements from
/// outside the core vocabulary, which always pass through: extensions may
/// appear anywhere.
pub struct SubstatementValidator {
    cardinalities: BTreeMap<String, Cardinality>,
    any: bool,
}

impl SubstatementValidator {
    pub fn builder() -> SubstatementValidatorBuilder {
        SubstatementValidatorBuilder {
            cardinalities: BTreeMap::new(),
        }
    }

    /// Validator admitting no substatements at all (extensions aside).
    pub fn empty() -> Self {
        Self {
            cardinalities: BTreeMap::new(),
            any: false,
        }
    }

    /// Validator admitting any substatement in any count. Used for opaque
    /// unknown statements whose shape is not ours to police.
    pub fn any() -> Self {
        Self {
            cardinalities: BTreeMap::new(),
            any: true,
        }
    }

    fn validate(&self, tree: &StatementTree, id: StatementId, def: &StatementDef) -> Result<()> {
        if self.any {
            return Ok(());
        }

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();

        for &child in tree.children(id) {
            let kind = tree.kind(child);
            if self.cardinalities.contains_key(kind) {
                *counts.entry(kind.as_ref()).or_insert(0) += 1;
                continue;
            }

            let core = match &tree.node(child).support {
                Some(support) => support.def().qname().namespace().as_ref() == YIN_NAMESPACE,
                None => true,
            };
            if core {
                return Err(Error::SubstatementValidation {
                    detail: format!("statement '{}' is not valid under '{}'", kind, def.keyword)
                        .into(),
                    span: tree.span(child).clone(),
                });
            }
        }

        for (kind, cardinality) in &self.cardinalities {
            let count = counts.get(kind.as_ref()).copied().unwrap_or(0);
            if count < cardinality.min {
                return Err(Error::SubstatementValidation {
                    detail: format!(
                        "minimal count of '{}' under '{}' is {}, detected {}",
                        kind, def.keyword, cardinality.min, count
                    )
                    .into(),
                    span: tree.span(id).clone(),
                });
            }
            if count > cardinality.max {
                return Err(Error::SubstatementValidation {
                    detail: format!(
                        "maximal count of '{}' under '{}' is {}, detected {}",
                        kind, def.keyword, cardinality.max, count
                    )
                    .into(),
                    span: tree.span(id).clone(),
                });
            }
        }

        Ok(())
    }
}

pub struct SubstatementValidatorBuilder {
    cardinalities: BTreeMap<String, Cardinality>,
}

impl SubstatementValidatorBuilder {
    pub fn optional(self, kind: &str) -> Self {
        self.with(kind, Cardinality::OPTIONAL)
    }

    pub fn mandatory(self, kind: &str) -> Self {
        self.with(kind, Cardinality::MANDATORY)
    }

    pub fn multiple(self, kind: &str) -> Self {
        self.with(kind, Cardinality::MULTIPLE)
    }

    pub fn with(mut self, kind: &str, cardinality: Cardinality) -> Self {
        self.cardinalities.insert(kind.into(), cardinality);
        self
    }

    pub fn build(self) -> SubstatementValidator {
        SubstatementValidator {
            cardinalities: self.cardinalities,
            any: false,
        }
    }
}

/// Builds the declared form of a statement from its context and the
/// already-built declared substatements.
pub type DeclaredFactory =
    fn(&StatementTree, StatementId, Vec<Rc<DeclaredStatement>>) -> DeclaredStatement;

/// Builds the effective form of a statement. Only invoked for supported
/// contexts, with identity resolved and child effectives built.
pub type EffectiveFactory = fn(EffectiveInputs<'_>) -> Result<EffectiveStatement>;

pub fn default_declared(
    tree: &StatementTree,
    id: StatementId,
    substatements: Vec<Rc<DeclaredStatement>>,
) -> DeclaredStatement {
    DeclaredStatement::new(
        tree.kind(id).clone(),
        tree.argument(id).cloned(),
        substatements,
        tree.span(id).clone(),
    )
}

pub fn default_effective(inputs: EffectiveInputs<'_>) -> Result<EffectiveStatement> {
    Ok(EffectiveStatement::new(inputs, EffectiveValue::None))
}

fn range_effective(inputs: EffectiveInputs<'_>) -> Result<EffectiveStatement> {
    let ranges = {
        let argument = inputs.declared.argument().cloned().unwrap_or_default();
        parse_range_expression(&argument, inputs.tree.span(inputs.id))?
    };
    Ok(EffectiveStatement::new(
        inputs,
        EffectiveValue::Ranges(Rc::new(ranges)),
    ))
}

fn length_effective(inputs: EffectiveInputs<'_>) -> Result<EffectiveStatement> {
    let ranges = {
        let argument = inputs.declared.argument().cloned().unwrap_or_default();
        parse_length_expression(&argument, inputs.tree.span(inputs.id))?
    };
    Ok(EffectiveStatement::new(
        inputs,
        EffectiveValue::Ranges(Rc::new(ranges)),
    ))
}

/// Everything the build needs to know about one statement kind: identity,
/// the declared and effective factories, the substatement table, and an
/// optional ancestor-chain pattern gating effective inclusion.
pub struct StatementSupport {
    def: StatementDef,
    validator: SubstatementValidator,
    declared_factory: DeclaredFactory,
    effective_factory: EffectiveFactory,
    applicability: Option<LineagePattern>,
}

impl StatementSupport {
    pub fn new(def: StatementDef, validator: SubstatementValidator) -> Self {
        Self {
            def,
            validator,
            declared_factory: default_declared,
            effective_factory: default_effective,
            applicability: None,
        }
    }

    pub fn with_declared_factory(mut self, factory: DeclaredFactory) -> Self {
        self.declared_factory = factory;
        self
    }

    pub fn with_effective_factory(mut self, factory: EffectiveFactory) -> Self {
        self.effective_factory = factory;
        self
    }

    pub fn with_applicability(mut self, pattern: LineagePattern) -> Self {
        self.applicability = Some(pattern);
        self
    }

    pub fn def(&self) -> &StatementDef {
        &self.def
    }

    pub fn applicability(&self) -> Option<&LineagePattern> {
        self.applicability.as_ref()
    }

    /// Check this context's argument presence and substatement counts.
    pub(crate) fn validate(&self, tree: &StatementTree, id: StatementId) -> Result<()> {
        match (self.def.argument, tree.argument(id)) {
            (ArgumentPolicy::Required, None) => {
                return Err(Error::SubstatementValidation {
                    detail: format!("statement '{}' requires an argument", self.def.keyword).into(),
                    span: tree.span(id).clone(),
                });
            }
            (ArgumentPolicy::Forbidden, Some(_)) => {
                return Err(Error::SubstatementValidation {
                    detail: format!("statement '{}' does not take an argument", self.def.keyword)
                        .into(),
                    span: tree.span(id).clone(),
                });
            }
            _ => {}
        }
        self.validator.validate(tree, id, &self.def)
    }

    pub(crate) fn make_declared(
        &self,
        tree: &StatementTree,
        id: StatementId,
        substatements: Vec<Rc<DeclaredStatement>>,
    ) -> DeclaredStatement {
        (self.declared_factory)(tree, id, substatements)
    }

    pub(crate) fn make_effective(&self, inputs: EffectiveInputs<'_>) -> Result<EffectiveStatement> {
        (self.effective_factory)(inputs)
    }
}

/// Thread-safe table mapping statement kinds to their supports.
///
/// Populated before compilation begins and read-only afterwards; lookups
/// are safe from concurrent build pipelines.
pub struct SupportRegistry {
    inner: DashMap<String, Rc<StatementSupport>>,
    name: String,
}

impl SupportRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: DashMap::new(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a support under its definition's keyword. Fails on blank
    /// keywords and on kinds already taken.
    pub fn register(&self, support: StatementSupport) -> Result<()> {
        let keyword = support.def().keyword().clone();
        if keyword.trim().is_empty() {
            return Err(Error::InvalidKeyword { keyword });
        }

        use dashmap::mapref::entry::Entry;
        match self.inner.entry(keyword) {
            Entry::Occupied(e) => Err(Error::AlreadyRegistered {
                keyword: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Rc::new(support));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, kind: &str) -> Option<Rc<StatementSupport>> {
        self.inner.get(kind).map(|entry| Rc::clone(entry.value()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.inner.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn list_kinds(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_REGISTRY: Rc<SupportRegistry> =
        Rc::new(builtin_registry().expect("builtin statement vocabulary is consistent"));
}

/// Global registry holding the built-in vocabulary. Shared by every
/// builder that does not supply its own registry.
pub fn default_registry() -> Rc<SupportRegistry> {
    DEFAULT_REGISTRY.clone()
}

/// Registry with the built-in statement vocabulary: the core data,
/// rpc and type statements plus the RFC 6241 filter extension.
pub fn builtin_registry() -> Result<SupportRegistry> {
    use ArgumentPolicy::{Forbidden, Required};

    let registry = SupportRegistry::new("DEFAULT_SUPPORT_REGISTRY");

    // Leaf-like statements: an argument and no body of their own.
    for keyword in [
        "yang-version",
        "namespace",
        "prefix",
        "description",
        "reference",
        "status",
        "config",
        "mandatory",
        "units",
        "default",
        "if-feature",
        "key",
        "value",
        "position",
    ] {
        registry.register(StatementSupport::new(
            StatementDef::core(keyword, Required),
            SubstatementValidator::empty(),
        ))?;
    }

    let documented = || {
        SubstatementValidator::builder()
            .optional("description")
            .optional("reference")
    };

    registry.register(
        StatementSupport::new(StatementDef::core("range", Required), documented().build())
            .with_effective_factory(range_effective),
    )?;
    registry.register(
        StatementSupport::new(StatementDef::core("length", Required), documented().build())
            .with_effective_factory(length_effective),
    )?;
    registry.register(StatementSupport::new(
        StatementDef::core("pattern", Required),
        documented().build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("feature", Required),
        documented()
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("enum", Required),
        documented()
            .optional("value")
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;
    registry.register(StatementSupport::new(
        StatementDef::core("bit", Required),
        documented()
            .optional("position")
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("type", Required),
        SubstatementValidator::builder()
            .optional("range")
            .optional("length")
            .multiple("pattern")
            .multiple("enum")
            .multiple("bit")
            .multiple("type")
            .build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("leaf", Required),
        documented()
            .mandatory("type")
            .optional("units")
            .optional("default")
            .optional("config")
            .optional("mandatory")
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;
    registry.register(StatementSupport::new(
        StatementDef::core("leaf-list", Required),
        documented()
            .mandatory("type")
            .optional("units")
            .multiple("default")
            .optional("config")
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;

    let data_body = || {
        documented()
            .optional("config")
            .optional("status")
            .multiple("if-feature")
            .multiple("container")
            .multiple("leaf")
            .multiple("leaf-list")
            .multiple("list")
            .multiple("anyxml")
    };

    registry.register(StatementSupport::new(
        StatementDef::core("container", Required),
        data_body().build(),
    ))?;
    registry.register(StatementSupport::new(
        StatementDef::core("list", Required),
        data_body().optional("key").build(),
    ))?;
    registry.register(StatementSupport::new(
        StatementDef::core("anyxml", Required),
        documented()
            .optional("config")
            .optional("mandatory")
            .optional("status")
            .multiple("if-feature")
            .build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("rpc", Required),
        documented()
            .optional("status")
            .multiple("if-feature")
            .optional("input")
            .optional("output")
            .build(),
    ))?;
    let io_body = || {
        SubstatementValidator::builder()
            .multiple("container")
            .multiple("leaf")
            .multiple("leaf-list")
            .multiple("list")
            .multiple("anyxml")
    };
    registry.register(StatementSupport::new(
        StatementDef::core("input", Forbidden),
        io_body().build(),
    ))?;
    registry.register(StatementSupport::new(
        StatementDef::core("output", Forbidden),
        io_body().build(),
    ))?;

    registry.register(StatementSupport::new(
        StatementDef::core("module", Required),
        documented()
            .optional("yang-version")
            .mandatory("namespace")
            .mandatory("prefix")
            .multiple("feature")
            .multiple("container")
            .multiple("leaf")
            .multiple("leaf-list")
            .multiple("list")
            .multiple("anyxml")
            .multiple("rpc")
            .build(),
    ))?;

    registry.register(
        StatementSupport::new(
            StatementDef::new(
                "get-filter-element-attributes",
                QName::new(
                    NETCONF_NAMESPACE.into(),
                    "get-filter-element-attributes".into(),
                ),
                Forbidden,
            ),
            SubstatementValidator::empty(),
        )
        .with_applicability(get_filter_lineage()),
    )?;

    Ok(registry)
}
