//! Tests for the transformation engine
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::error::Error;
use crate::object::{DeclaredType, Object, ObjectGraph, Value};

/// Scheme whose rules record their invocations in the target
struct Probe;

impl TransformationScheme for Probe {
    type Subject = Value;
    type Source = ObjectGraph;
    type Target = Vec<String>;
    type State = usize;
    type Output = Value;

    fn runtime_type(subject: &Value, source: &ObjectGraph) -> DeclaredType {
        source.runtime_type(subject)
    }

    fn inspect<'a>(subject: &'a Value, source: &'a ObjectGraph) -> Inspected<'a> {
        Inspected::Value(source, subject)
    }
}

fn path() -> TransformationPath {
    TransformationPath::new("A", "B")
}

fn recording(name: &'static str, priority: i32, accepts: fn(&Value) -> bool) -> Box<dyn TransformationRule<Probe>> {
    Box::new(FnRule::<Probe, _, _>::new(
        name,
        priority,
        move |params| accepts(params.subject()),
        move |params, _| {
            params.target_mut().push(name.to_string());
            *params.state_mut() += 1;
            Ok(params.subject().clone())
        },
    ))
}

fn always(_: &Value) -> bool {
    true
}

fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Integer(_))
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

fn container(rules: Vec<Box<dyn TransformationRule<Probe>>>) -> RulesContainer<Probe> {
    RulesContainer::builder()
        .register_all(&path(), rules)
        .build()
        .unwrap()
}

#[test]
fn test_filter_returns_exactly_applicable_rules() {
    let container = container(vec![
        recording("integers", 1, is_integer),
        recording("strings", 1, is_string),
        recording("fallback", 5, always),
    ]);
    let graph = ObjectGraph::new();
    let mut target = Vec::new();
    let mut state = 0;
    let params = TransformationParameters::<Probe>::new(
        path(),
        Value::from(3),
        DeclaredType::Integer,
        &graph,
        &mut target,
        &mut state,
    );

    let groups = RulesFilter::filter(&container, &params, &MessageFactory::new()).unwrap();
    let names: Vec<(i32, Vec<&str>)> = groups
        .iter()
        .map(|(priority, rules)| (*priority, rules.iter().map(|r| r.name()).collect()))
        .collect();

    assert_eq!(names, vec![(1, vec!["integers"]), (5, vec!["fallback"])]);
}

#[test]
fn test_single_preferred_rule_is_invoked() {
    let engine = TransformationFactory::new(container(vec![
        recording("fallback", 5, always),
        recording("strings", 1, is_string),
    ]));
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    let result = engine.transform(&path(), &graph, &mut target, Value::from("abc")).unwrap();

    assert_eq!(result, Value::from("abc"));
    assert_eq!(target, vec!["strings".to_string()]);
}

#[test]
fn test_tie_fails_without_invoking_rules() {
    let engine = TransformationFactory::new(container(vec![
        recording("first", 2, always),
        recording("second", 2, always),
        recording("later", 9, always),
    ]));
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    let err = engine
        .transform(&path(), &graph, &mut target, Value::from(1))
        .unwrap_err();

    match err {
        Error::AmbiguousRules { priority, rules, subject, .. } => {
            assert_eq!(priority, 2);
            assert_eq!(rules, vec!["first".to_string(), "second".to_string()]);
            assert_eq!(subject, "integer 1");
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(target.is_empty());
}

#[test]
fn test_identity_rule_then_ambiguity() {
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    let engine = TransformationFactory::new(container(vec![recording("identity", 0, always)]));
    for subject in [Value::Null, Value::from(true), Value::from(2.5), Value::from("x")] {
        let result = engine.transform(&path(), &graph, &mut target, subject.clone()).unwrap();
        assert_eq!(result, subject);
    }

    let engine = TransformationFactory::new(container(vec![
        recording("identity", 0, always),
        recording("other", 0, always),
    ]));
    let err = engine
        .transform(&path(), &graph, &mut target, Value::from(1))
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousRules { .. }));
}

#[test]
fn test_unknown_path_and_no_applicable_rule_are_distinct() {
    let engine = TransformationFactory::new(container(vec![recording("integers", 0, is_integer)]));
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    let err = engine
        .transform(&TransformationPath::new("A", "C"), &graph, &mut target, Value::from(1))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPath { .. }));

    let err = engine
        .transform(&path(), &graph, &mut target, Value::from("abc"))
        .unwrap_err();
    match err {
        Error::NoApplicableRule { subject, path } => {
            assert_eq!(subject, "string (3 chars)");
            assert_eq!(path.to_string(), "A -> B");
        }
        other => panic!("expected no applicable rule, got {other:?}"),
    }
}

#[test]
fn test_builder_rejects_duplicate_names() {
    let result = RulesContainer::<Probe>::builder()
        .register_boxed(path(), recording("same", 0, always))
        .register_boxed(path(), recording("same", 1, is_integer))
        .build();
    assert!(matches!(result, Err(Error::Configuration { .. })));

    let container = RulesContainer::<Probe>::builder()
        .register_boxed(path(), recording("same", 0, always))
        .register_boxed(path().reversed(), recording("same", 0, always))
        .build()
        .unwrap();
    assert_eq!(container.len(), 2);
    assert_eq!(container.paths().len(), 2);
}

#[test]
fn test_first_applicable_ignores_priority() {
    let engine = TransformationFactory::new(container(vec![
        recording("late", 9, always),
        recording("early", 0, always),
    ]))
    .with_strategy(FirstApplicableRule);
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    engine.transform(&path(), &graph, &mut target, Value::from(1)).unwrap();

    assert_eq!(engine.strategy_name(), FIRST_APPLICABLE);
    assert_eq!(target, vec!["late".to_string()]);
}

#[test]
fn test_nested_steps_share_target_and_state() {
    let sum = FnRule::<Probe, _, _>::new(
        "sum",
        0,
        |params| matches!(params.source().resolve(params.subject()), Some(Object::List(_))),
        |params, engine| {
            let graph = params.source();
            let items = match graph.resolve(params.subject()) {
                Some(Object::List(items)) => items.as_slice(),
                _ => &[],
            };
            let mut total = 0;
            for item in items {
                if let Value::Integer(i) = engine.transform_nested(params, item.clone(), DeclaredType::Integer)? {
                    total += i;
                }
            }
            *params.state_mut() += 1;
            Ok(Value::Integer(total))
        },
    );
    let container = RulesContainer::builder()
        .register(path(), sum)
        .register_boxed(path(), recording("integer", 0, is_integer))
        .build()
        .unwrap();
    let engine = TransformationFactory::new(container);

    let mut graph = ObjectGraph::new();
    let list = graph.add_list(vec![Value::from(1), Value::from(2), Value::from(3)]);
    let mut target = Vec::new();
    let mut steps = 0;

    let total = engine
        .transform_with_state(&path(), &graph, &mut target, &mut steps, list, DeclaredType::List)
        .unwrap();

    assert_eq!(total, Value::Integer(6));
    assert_eq!(steps, 4);
    assert_eq!(target.len(), 3);
}

#[test]
fn test_depth_limit() {
    let descend = FnRule::<Probe, _, _>::new("descend", 0, |_| true, |params, engine| {
        let subject = params.subject().clone();
        engine.transform_nested(params, subject, DeclaredType::Any)
    });
    let container = RulesContainer::builder().register(path(), descend).build().unwrap();
    let engine = TransformationFactory::new(container).with_max_depth(3);
    let graph = ObjectGraph::new();
    let mut target = Vec::new();

    let err = engine
        .transform(&path(), &graph, &mut target, Value::from(1))
        .unwrap_err();

    match err {
        Error::DepthExceeded { limit, subject, .. } => {
            assert_eq!(limit, 3);
            assert_eq!(subject, "integer 1");
        }
        other => panic!("expected depth error, got {other:?}"),
    }
}

#[test]
fn test_strategy_by_name() {
    assert_eq!(strategy_by_name::<Probe>(HIGHEST_PRIORITY).unwrap().name(), HIGHEST_PRIORITY);
    assert_eq!(strategy_by_name::<Probe>(FIRST_APPLICABLE).unwrap().name(), FIRST_APPLICABLE);
    assert!(strategy_by_name::<Probe>("random").is_err());
}

#[test]
fn test_summaries_sorted_by_priority() {
    let container = container(vec![
        recording("fallback", 5, always),
        recording("strings", 1, is_string),
    ]);
    let summaries = container.summaries();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name, "strings");
    assert_eq!(summaries[1].priority, 5);
    assert_eq!(summaries[0].path, path());
}
