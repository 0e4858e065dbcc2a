//! Encode/decode integration tests for the built-in XML rules

use jmul_core::transformation::{FirstApplicableRule, DEFAULT_MAX_DEPTH};
use jmul_core::xml::{self, XmlDocument};
use jmul_core::{DeclaredType, Error, Field, Object, ObjectGraph, Value};
use serde_json::json;

fn round_trip(graph: &ObjectGraph, root: &Value) -> (ObjectGraph, Value) {
    let document = xml::encode(&xml::encoder().unwrap(), graph, root).unwrap();
    let text = document.to_xml_string(true).unwrap();
    let parsed = XmlDocument::parse(&text).unwrap();
    xml::decode(&xml::decoder().unwrap(), &parsed).unwrap()
}

fn encode_compact(graph: &ObjectGraph, root: &Value) -> String {
    let document = xml::encode(&xml::encoder().unwrap(), graph, root).unwrap();
    document.to_xml_string(false).unwrap()
}

#[test]
fn test_self_referential_list() {
    let mut graph = ObjectGraph::new();
    let list = graph.add_list(vec![Value::from(5)]);
    graph.push_item(list.as_object().unwrap(), list.clone()).unwrap();

    let xml = encode_compact(&graph, &list);
    assert!(xml.contains("<list id=\"1\"><integer id=\"2\" value=\"5\"/><reference ref=\"1\"/></list>"));

    let (decoded, root) = round_trip(&graph, &list);
    match decoded.resolve(&root) {
        Some(Object::List(items)) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], Value::Integer(5));
            assert_eq!(items[1], root);
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_shared_record_decodes_as_shared() {
    let mut graph = ObjectGraph::new();
    let address = graph.add_record(
        "Address",
        vec![Field::new("city", DeclaredType::String, "Oslo")],
    );
    let declared = DeclaredType::record("Address");
    let person = graph.add_record(
        "Person",
        vec![
            Field::new("home", declared.clone(), address.clone()),
            Field::new("work", declared, address),
        ],
    );

    let (decoded, root) = round_trip(&graph, &person);
    let Some(Object::Record { fields, .. }) = decoded.resolve(&root) else {
        panic!("expected record");
    };
    assert_eq!(fields[0].value, fields[1].value);
    assert!(fields[0].value.as_object().is_some());
    assert_eq!(decoded.len(), 2);
}

#[test]
fn test_mutual_cycle_between_records() {
    let mut graph = ObjectGraph::new();
    let node = |label: &str, next: Value| {
        vec![
            Field::new("label", DeclaredType::String, label),
            Field::new("next", DeclaredType::Any, next),
        ]
    };
    let a = graph.add_record("Node", node("a", Value::Null));
    let b = graph.add_record("Node", node("b", a.clone()));
    graph.set_field(a.as_object().unwrap(), "next", b).unwrap();

    let (decoded, root) = round_trip(&graph, &a);
    let next = |value: &Value| match decoded.resolve(value) {
        Some(Object::Record { fields, .. }) => fields[1].value.clone(),
        other => panic!("expected record, got {other:?}"),
    };

    let second = next(&root);
    assert_ne!(second, root);
    assert_eq!(next(&second), root);
}

#[test]
fn test_equal_empty_lists_stay_distinct() {
    let mut graph = ObjectGraph::new();
    let a = graph.add_list(vec![]);
    let b = graph.add_list(vec![]);
    let outer = graph.add_list(vec![a.clone(), b, a]);

    let (decoded, root) = round_trip(&graph, &outer);
    let Some(Object::List(items)) = decoded.resolve(&root) else {
        panic!("expected list");
    };
    assert_ne!(items[0], items[1]);
    assert_eq!(items[0], items[2]);
}

#[test]
fn test_unknown_reference_is_malformed() {
    let document = XmlDocument::parse(
        r#"<?xml version="1.0"?><object-graph declared-type="list"><list id="1"><reference ref="2"/></list></object-graph>"#,
    )
    .unwrap();

    let err = xml::decode(&xml::decoder().unwrap(), &document).unwrap_err();
    assert!(matches!(err, Error::Malformed { .. }), "{err}");
}

#[test]
fn test_json_graph_round_trip() {
    let input = json!({
        "name": "catalog",
        "items": [
            {"sku": "a-1", "price": 9.5, "tags": ["new", "sale"]},
            {"sku": "b-2", "price": 12, "tags": []}
        ],
        "published": true,
        "notes": null
    });
    let (graph, root) = ObjectGraph::from_json(&input).unwrap();

    let (decoded, decoded_root) = round_trip(&graph, &root);
    assert_eq!(decoded.to_json(&decoded_root), input);
}

#[test]
fn test_special_characters_survive() {
    let mut graph = ObjectGraph::new();
    let mut entries = std::collections::BTreeMap::new();
    entries.insert("<key & \"quote\">".to_string(), Value::from("line\none 'two'"));
    let map = graph.add_map(entries);

    let (decoded, root) = round_trip(&graph, &map);
    match decoded.resolve(&root) {
        Some(Object::Map(entries)) => {
            assert_eq!(entries["<key & \"quote\">"], Value::from("line\none 'two'"));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_first_applicable_strategy_keeps_references() {
    // The reference rule is registered first on the built-in path
    let engine = xml::encoder().unwrap().with_strategy(FirstApplicableRule);
    let mut graph = ObjectGraph::new();
    let list = graph.add_list(vec![Value::from(1), Value::from(1)]);

    let xml = xml::encode(&engine, &graph, &list)
        .unwrap()
        .to_xml_string(false)
        .unwrap();
    assert!(xml.contains("<reference ref=\"2\"/>"));
}

#[test]
fn test_equal_records_stay_distinct() {
    let mut graph = ObjectGraph::new();
    let bag = |graph: &mut ObjectGraph| {
        let items = graph.add_list(vec![]);
        graph.add_record("Bag", vec![Field::new("items", DeclaredType::List, items)])
    };
    let first = bag(&mut graph);
    let second = bag(&mut graph);
    let root = graph.add_list(vec![first, second]);

    let xml = encode_compact(&graph, &root);
    assert!(!xml.contains("<reference"), "{xml}");

    let (decoded, root) = round_trip(&graph, &root);
    assert_eq!(decoded.len(), graph.len());
    let Some(Object::List(bags)) = decoded.resolve(&root) else {
        panic!("expected list");
    };
    let items = |value: &Value| match decoded.resolve(value) {
        Some(Object::Record { fields, .. }) => fields[0].value.clone(),
        other => panic!("expected record, got {other:?}"),
    };
    assert_ne!(bags[0], bags[1]);
    assert_ne!(items(&bags[0]), items(&bags[1]));
}

#[test]
fn test_ring_of_lookalike_records_keeps_both_nodes() {
    let mut graph = ObjectGraph::new();
    let declared = DeclaredType::record("Node");
    let a = graph.add_record("Node", vec![Field::new("next", declared.clone(), Value::Null)]);
    let b = graph.add_record("Node", vec![Field::new("next", declared, a.clone())]);
    graph.set_field(a.as_object().unwrap(), "next", b).unwrap();

    let xml = encode_compact(&graph, &a);
    assert!(xml.contains("<reference ref=\"1\"/>"), "{xml}");
    assert!(xml.contains("<record id=\"2\""), "{xml}");

    let (decoded, root) = round_trip(&graph, &a);
    assert_eq!(decoded.len(), 2);
    let next = |value: &Value| match decoded.resolve(value) {
        Some(Object::Record { fields, .. }) => fields[0].value.clone(),
        other => panic!("expected record, got {other:?}"),
    };
    assert_ne!(next(&root), root);
    assert_eq!(next(&next(&root)), root);
}

/// Lists nested `levels` deep below the root list
fn nested_lists(graph: &mut ObjectGraph, levels: usize) -> Value {
    let mut value = graph.add_list(vec![]);
    for _ in 0..levels {
        value = graph.add_list(vec![value]);
    }
    value
}

#[test]
fn test_nesting_just_inside_default_limit() {
    let mut graph = ObjectGraph::new();
    let root = nested_lists(&mut graph, DEFAULT_MAX_DEPTH - 1);

    let (decoded, _) = round_trip(&graph, &root);
    assert_eq!(decoded.len(), DEFAULT_MAX_DEPTH);
}

#[test]
fn test_nesting_beyond_default_limit() {
    let mut graph = ObjectGraph::new();
    let root = nested_lists(&mut graph, DEFAULT_MAX_DEPTH + 1);
    let err = xml::encode(&xml::encoder().unwrap(), &graph, &root).unwrap_err();
    assert!(
        matches!(err, Error::DepthExceeded { limit, .. } if limit == DEFAULT_MAX_DEPTH),
        "{err}"
    );

    // The decoder sees one more step because of the <object-graph> wrapper
    let mut graph = ObjectGraph::new();
    let root = nested_lists(&mut graph, DEFAULT_MAX_DEPTH);
    let document = xml::encode(&xml::encoder().unwrap(), &graph, &root).unwrap();
    let err = xml::decode(&xml::decoder().unwrap(), &document).unwrap_err();
    assert!(
        matches!(err, Error::DepthExceeded { limit, .. } if limit == DEFAULT_MAX_DEPTH),
        "{err}"
    );
}
