// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod builder;
mod effective;
mod error;
mod ident;
mod lineage;
mod number;
mod qname;
mod range;
mod source;
mod stmt;
mod support;
mod typeaudit;

pub use builder::{EffectiveModel, ModelBuilder};
pub use effective::{EffectiveInputs, EffectiveStatement, EffectiveValue};
pub use error::{Error, Result};
pub use ident::qname_from_argument;
pub use lineage::{get_filter_lineage, LineagePattern};
pub use number::{BigInt, Number};
pub use qname::{is_identifier, QName, SchemaPath, YangVersion};
pub use range::{
    format_ranges, parse_length_expression, parse_range_expression, Bound, ValueRange,
};
pub use source::{Source, Span};
pub use stmt::{DeclaredStatement, Phase, StatementId, StatementTree};
pub use support::{
    builtin_registry, default_declared, default_effective, default_registry, ArgumentPolicy,
    Cardinality, DeclaredFactory, EffectiveFactory, StatementDef, StatementSupport,
    SubstatementValidator, SubstatementValidatorBuilder, SupportRegistry, NETCONF_NAMESPACE,
    YIN_NAMESPACE,
};
pub use typeaudit::{has_guarded_default, has_guarded_default_value};

/// Reference counted pointer type used throughout.
/// `Arc` so that registries and finished models can cross threads.
pub type Rc<T> = std::sync::Arc<T>;
