// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use yangrus::*;

const MODULE_TEXT: &str = r#"module acme {
  yang-version 1.1;
  namespace "urn:example:acme";
  prefix acme;

  feature extended;

  leaf mode {
    type enumeration {
      enum normal;
      enum turbo { if-feature extended; }
    }
    default turbo;
  }

  leaf percentage {
    type uint8 { range "0..50|60..100"; }
  }

  rpc get {
    input {
      anyxml filter {
        get-filter-element-attributes;
      }
    }
  }
}
"#;

fn source() -> Result<Source> {
    Ok(Source::from_contents(
        "acme.yang".to_string(),
        MODULE_TEXT.to_string(),
    )?)
}

fn span_of(source: &Source, needle: &str) -> Span {
    let start = source.contents().find(needle).unwrap_or(0) as u32;
    source.span_at(start, start + needle.len() as u32)
}

/// The statement tree a parser would produce for `MODULE_TEXT`, with the
/// rpc named `rpc_name`.
fn module_tree(src: &Source, rpc_name: &str) -> StatementTree {
    let mut t = StatementTree::new(
        "module",
        Some("acme"),
        "urn:example:acme",
        span_of(src, "module acme"),
    );
    t.add_prefix("acme", "urn:example:acme");
    let root = t.root();
    t.append(root, "yang-version", Some("1.1"), span_of(src, "yang-version"));
    t.append(
        root,
        "namespace",
        Some("urn:example:acme"),
        span_of(src, "namespace"),
    );
    t.append(root, "prefix", Some("acme"), span_of(src, "prefix acme"));
    t.append(root, "feature", Some("extended"), span_of(src, "feature extended"));

    let mode = t.append(root, "leaf", Some("mode"), span_of(src, "leaf mode"));
    let enumeration = t.append(
        mode,
        "type",
        Some("enumeration"),
        span_of(src, "type enumeration"),
    );
    t.append(enumeration, "enum", Some("normal"), span_of(src, "enum normal"));
    let turbo = t.append(enumeration, "enum", Some("turbo"), span_of(src, "enum turbo"));
    t.append(turbo, "if-feature", Some("extended"), span_of(src, "if-feature"));
    t.append(mode, "default", Some("turbo"), span_of(src, "default turbo"));

    let percentage = t.append(root, "leaf", Some("percentage"), span_of(src, "leaf percentage"));
    let uint8 = t.append(percentage, "type", Some("uint8"), span_of(src, "type uint8"));
    t.append(uint8, "range", Some("0..50|60..100"), span_of(src, "range"));

    let rpc = t.append(root, "rpc", Some(rpc_name), span_of(src, "rpc"));
    let input = t.append(rpc, "input", None, span_of(src, "input"));
    let filter = t.append(input, "anyxml", Some("filter"), span_of(src, "anyxml filter"));
    t.append(
        filter,
        "get-filter-element-attributes",
        None,
        span_of(src, "get-filter-element-attributes"),
    );
    t
}

fn find<'a>(parent: &'a EffectiveStatement, local: &str) -> Option<&'a Rc<EffectiveStatement>> {
    parent
        .substatements()
        .iter()
        .find(|s| s.node_type().local_name().as_ref() == local)
}

fn child<'a>(parent: &'a EffectiveStatement, local: &str) -> &'a Rc<EffectiveStatement> {
    match find(parent, local) {
        Some(statement) => statement,
        None => panic!("no '{local}' under '{}'", parent.node_type()),
    }
}

#[test]
fn build_effective_model() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "get");
    let model = ModelBuilder::new().build(&mut tree)?;

    for id in tree.ids() {
        assert_eq!(tree.phase(id), Phase::EffectiveModel);
    }

    assert_eq!(model.version(), YangVersion::V1_1);
    let root = model.root();
    assert!(root.qname().is_none());
    assert!(root.path().is_empty());
    assert_eq!(root.node_parameter().unwrap().as_ref(), "acme");
    assert_eq!(root.substatements().len(), 7);

    let mode = child(root, "leaf");
    let mode_qname = mode.qname().unwrap();
    assert_eq!(mode_qname.namespace().as_ref(), "urn:example:acme");
    assert_eq!(mode_qname.local_name().as_ref(), "mode");
    assert_eq!(mode.path().len(), 1);
    assert_eq!(mode.path().to_string(), "/(urn:example:acme)mode");

    let rpc = child(root, "rpc");
    let input = child(rpc, "input");
    let input_qname = input.qname().unwrap();
    assert_eq!(input_qname.local_name().as_ref(), "input");
    assert_eq!(input_qname.namespace().as_ref(), "urn:example:acme");
    assert_eq!(input.path().len(), 2);

    let filter = child(input, "anyxml");
    assert_eq!(filter.path().len(), 3);

    // The NETCONF extension survives under a get rpc.
    let gfea = child(filter, "get-filter-element-attributes");
    assert_eq!(gfea.node_type().namespace().as_ref(), NETCONF_NAMESPACE);
    let gfea_qname = gfea.qname().unwrap();
    assert_eq!(gfea_qname.namespace().as_ref(), "urn:example:acme");
    assert_eq!(
        gfea_qname.local_name().as_ref(),
        "get-filter-element-attributes"
    );
    assert_eq!(gfea.path().len(), 4);
    Ok(())
}

#[test]
fn lineage_mismatch_excludes_statement() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "edit-config");
    let model = ModelBuilder::new().build(&mut tree)?;

    let filter = child(child(child(model.root(), "rpc"), "input"), "anyxml");
    assert!(find(filter, "get-filter-element-attributes").is_none());
    Ok(())
}

#[test]
fn range_constraints_resolved() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "get");
    let model = ModelBuilder::new().build(&mut tree)?;

    let percentage = model
        .root()
        .substatements()
        .iter()
        .find(|s| {
            s.node_type().local_name().as_ref() == "leaf"
                && s.node_parameter().map(|p| p.as_ref()) == Some("percentage")
        })
        .unwrap();
    let ranges = child(percentage, "type")
        .substatements()
        .first()
        .and_then(|range| range.ranges())
        .unwrap();

    assert_eq!(ranges.len(), 2);
    assert_eq!(format_ranges(ranges), "0..50|60..100");
    assert_eq!(*ranges[0].lower(), Bound::Value(Number::from(0u64)));
    assert_eq!(*ranges[1].upper(), Bound::Value(Number::from(100u64)));
    Ok(())
}

#[test]
fn length_constraints_resolved() -> Result<()> {
    let src = source()?;
    let mut tree = StatementTree::new(
        "module",
        Some("acme"),
        "urn:example:acme",
        span_of(&src, "module acme"),
    );
    let root = tree.root();
    tree.append(root, "namespace", Some("urn:example:acme"), span_of(&src, "namespace"));
    tree.append(root, "prefix", Some("acme"), span_of(&src, "prefix acme"));
    let name = tree.append(root, "leaf", Some("name"), span_of(&src, "leaf"));
    let string = tree.append(name, "type", Some("string"), span_of(&src, "type"));
    tree.append(string, "length", Some("1..63|min..max"), span_of(&src, "module"));

    let err = ModelBuilder::new().build(&mut tree).unwrap_err();
    assert!(matches!(err, Error::OverlappingRanges { .. }));

    let mut tree = StatementTree::new(
        "module",
        Some("acme"),
        "urn:example:acme",
        span_of(&src, "module acme"),
    );
    let root = tree.root();
    tree.append(root, "namespace", Some("urn:example:acme"), span_of(&src, "namespace"));
    tree.append(root, "prefix", Some("acme"), span_of(&src, "prefix acme"));
    let name = tree.append(root, "leaf", Some("name"), span_of(&src, "leaf"));
    let string = tree.append(name, "type", Some("string"), span_of(&src, "type"));
    tree.append(string, "length", Some("1..63"), span_of(&src, "module"));

    let model = ModelBuilder::new().build(&mut tree)?;
    let length = child(child(child(model.root(), "leaf"), "type"), "length");
    assert_eq!(format_ranges(length.ranges().unwrap()), "1..63");
    Ok(())
}

#[test]
fn overlapping_ranges_reported_with_location() -> Result<()> {
    let src = source()?;
    let mut tree = StatementTree::new(
        "module",
        Some("acme"),
        "urn:example:acme",
        span_of(&src, "module acme"),
    );
    let root = tree.root();
    tree.append(root, "namespace", Some("urn:example:acme"), span_of(&src, "namespace"));
    tree.append(root, "prefix", Some("acme"), span_of(&src, "prefix acme"));
    let leaf = tree.append(root, "leaf", Some("percentage"), span_of(&src, "leaf percentage"));
    let ty = tree.append(leaf, "type", Some("uint8"), span_of(&src, "type uint8"));
    tree.append(ty, "range", Some("0..50|40..100"), span_of(&src, "range"));

    let err = ModelBuilder::new().build(&mut tree).unwrap_err();
    match &err {
        Error::OverlappingRanges { expression, .. } => {
            assert_eq!(expression.as_ref(), "0..50|40..100");
        }
        other => panic!("expected OverlappingRanges, got {other:?}"),
    }

    let report = err.report();
    assert!(report.contains("acme.yang:"), "report was: {report}");
    assert!(report.contains("are not disjoint"), "report was: {report}");
    Ok(())
}

#[test]
fn guarded_default_audit() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "get");
    let model = ModelBuilder::new().build(&mut tree)?;

    let mode_type = child(child(model.root(), "leaf"), "type");
    assert_eq!(mode_type.node_parameter().unwrap().as_ref(), "enumeration");

    // "turbo" is behind if-feature extended; "normal" is not.
    assert!(has_guarded_default_value(model.version(), mode_type, "turbo"));
    assert!(!has_guarded_default_value(model.version(), mode_type, "normal"));

    // Version 1 predates if-feature on enums.
    assert!(!has_guarded_default_value(YangVersion::V1, mode_type, "turbo"));
    Ok(())
}

#[test]
fn unknown_statements_strict_and_passthrough() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "get");
    tree.add_prefix("vx", "urn:example:vendor");
    let knob = tree.append(tree.root(), "vx:annotation", Some("checked"), span_of(&src, "module"));
    tree.append(knob, "vx:severity", Some("low"), span_of(&src, "module"));

    let err = ModelBuilder::new().build(&mut tree).unwrap_err();
    assert!(matches!(err, Error::UnknownStatementKind { .. }));

    // Same tree again, with passthrough enabled.
    let mut tree = module_tree(&src, "get");
    tree.add_prefix("vx", "urn:example:vendor");
    let knob = tree.append(tree.root(), "vx:annotation", Some("checked"), span_of(&src, "module"));
    tree.append(knob, "vx:severity", Some("low"), span_of(&src, "module"));

    let model = ModelBuilder::new().permit_unknown().build(&mut tree)?;
    let annotation = child(model.root(), "annotation");
    assert_eq!(
        annotation.node_type().namespace().as_ref(),
        "urn:example:vendor"
    );
    assert_eq!(annotation.node_parameter().unwrap().as_ref(), "checked");
    let severity = child(annotation, "severity");
    assert_eq!(severity.node_parameter().unwrap().as_ref(), "low");
    Ok(())
}

#[test]
fn copied_statement_reuses_original_identity() -> Result<()> {
    let src = source()?;
    let mut tree = StatementTree::new(
        "module",
        Some("acme"),
        "urn:example:acme",
        span_of(&src, "module acme"),
    );
    let root = tree.root();
    tree.append(root, "namespace", Some("urn:example:acme"), span_of(&src, "namespace"));
    tree.append(root, "prefix", Some("acme"), span_of(&src, "prefix acme"));
    let original = tree.append(root, "container", Some("config"), span_of(&src, "module"));
    let mtu = tree.append(original, "leaf", Some("mtu"), span_of(&src, "leaf"));
    tree.append(mtu, "type", Some("uint16"), span_of(&src, "type"));
    let copy = tree.append(root, "container", Some("config-copy"), span_of(&src, "module"));
    tree.set_original(copy, original);

    let model = ModelBuilder::new().build(&mut tree)?;
    let containers: Vec<_> = model
        .root()
        .substatements()
        .iter()
        .filter(|s| s.node_type().local_name().as_ref() == "container")
        .collect();
    assert_eq!(containers.len(), 2);

    // Identity comes from the original context, not the copy's argument.
    assert_eq!(containers[1].qname(), containers[0].qname());
    assert_eq!(containers[1].qname().unwrap().local_name().as_ref(), "config");
    assert_eq!(containers[1].node_parameter().unwrap().as_ref(), "config-copy");

    // Equality and hashing follow the resolved identity.
    assert_eq!(containers[0].qname(), containers[1].qname());
    Ok(())
}

#[test]
fn model_exports_to_json() -> Result<()> {
    let src = source()?;
    let mut tree = module_tree(&src, "get");
    let model = ModelBuilder::new().build(&mut tree)?;

    let json: serde_json::Value = serde_json::from_str(&model.to_json_str()?)?;
    assert_eq!(json["version"], "1.1");

    let root = &json["root"];
    assert_eq!(root["node-type"]["local-name"], "module");
    assert_eq!(root["parameter"], "acme");
    assert!(root.get("qname").is_none());

    let subs = root["substatements"].as_array().unwrap();
    let percentage = subs
        .iter()
        .find(|s| s["parameter"] == "percentage")
        .unwrap();
    let range = &percentage["substatements"][0]["substatements"][0];
    assert_eq!(range["node-type"]["local-name"], "range");
    assert_eq!(range["ranges"][0]["lower"], 0);
    assert_eq!(range["ranges"][1]["upper"], 100);

    let mode = subs.iter().find(|s| s["parameter"] == "mode").unwrap();
    assert_eq!(mode["qname"]["namespace"], "urn:example:acme");
    assert_eq!(mode["qname"]["local-name"], "mode");
    Ok(())
}
