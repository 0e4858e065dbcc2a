//! XML to object graph rules
//!
//! One rule per element name. Objects are allocated and registered under
//! their id before their children are decoded, so references back to an
//! enclosing object resolve.

use super::document::{NodeId, XmlDocument};
use super::*;
use crate::error::{Error, Result};
use crate::object::{DeclaredType, Field, ObjectGraph, Value};
use crate::transformation::{
    Inspected, ReferenceTable, RulesContainer, TransformationFactory, TransformationParameters,
    TransformationPath, TransformationRule, TransformationScheme,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Decoding of XML documents into object graphs
pub struct XmlToObject;

impl TransformationScheme for XmlToObject {
    type Subject = NodeId;
    type Source = XmlDocument;
    type Target = ObjectGraph;
    type State = ReferenceTable;
    type Output = Value;

    fn runtime_type(subject: &NodeId, source: &XmlDocument) -> DeclaredType {
        match source.name(*subject) {
            Some(BOOLEAN) => DeclaredType::Boolean,
            Some(INTEGER) => DeclaredType::Integer,
            Some(FLOAT) => DeclaredType::Float,
            Some(STRING) => DeclaredType::String,
            Some(LIST) => DeclaredType::List,
            Some(MAP) => DeclaredType::Map,
            Some(RECORD) => source
                .attribute(*subject, TYPE)
                .map(DeclaredType::record)
                .unwrap_or_default(),
            Some(OBJECT_GRAPH) => source
                .attribute(*subject, DECLARED_TYPE)
                .and_then(|declared| declared.parse().ok())
                .unwrap_or_default(),
            _ => DeclaredType::Any,
        }
    }

    fn inspect<'a>(subject: &'a NodeId, source: &'a XmlDocument) -> Inspected<'a> {
        Inspected::Node(source, *subject)
    }
}

type Params<'a> = TransformationParameters<'a, XmlToObject>;
/// Engine over the "XML" -> "Object" path
pub type Engine = TransformationFactory<XmlToObject>;

fn element_named(params: &Params<'_>, name: &str) -> bool {
    params.source().name(*params.subject()) == Some(name)
}

/// The only element child of `node`
fn single_child(document: &XmlDocument, node: NodeId) -> Result<NodeId> {
    let mut children = document.element_children(node);
    match (children.next(), children.next()) {
        (Some(child), None) => Ok(child),
        (None, _) => Err(Error::malformed_at(
            "expected exactly one child element, found none",
            describe(document, node),
        )),
        (Some(_), Some(_)) => Err(Error::malformed_at(
            "expected exactly one child element, found several",
            describe(document, node),
        )),
    }
}

fn describe(document: &XmlDocument, node: NodeId) -> String {
    format!("<{}> (node {})", document.name(node).unwrap_or("?"), node.index())
}

fn parse_id(document: &XmlDocument, node: NodeId, attribute: &str) -> Result<u64> {
    let text = document.required_attribute(node, attribute)?;
    text.parse().map_err(|_| {
        Error::malformed_at(
            format!("attribute '{attribute}' must be an unsigned integer, found '{text}'"),
            describe(document, node),
        )
    })
}

/// Register the value under the element's `id` attribute, if it has one
fn register(params: &mut Params<'_>, value: &Value) -> Result<()> {
    let document = params.source();
    let node = *params.subject();
    if document.attribute(node, ID).is_none() {
        return Ok(());
    }
    let id = parse_id(document, node, ID)?;
    params.state_mut().register(id, value.clone())
}

fn check_declared(
    document: &XmlDocument,
    node: NodeId,
    declared: &DeclaredType,
    graph: &ObjectGraph,
    value: &Value,
) -> Result<()> {
    let runtime = graph.runtime_type(value);
    if declared.accepts(&runtime) {
        Ok(())
    } else {
        Err(Error::malformed_at(
            format!("value of type {runtime} does not match declared type {declared}"),
            describe(document, node),
        ))
    }
}

/// `<object-graph declared-type="...">` wrapping the root value
pub struct ObjectGraphRule;

impl TransformationRule<XmlToObject> for ObjectGraphRule {
    fn name(&self) -> &str {
        OBJECT_GRAPH
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, OBJECT_GRAPH)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<Value> {
        let document = params.source();
        let node = *params.subject();
        let declared = match document.attribute(node, DECLARED_TYPE) {
            Some(text) => text.parse::<DeclaredType>()?,
            None => DeclaredType::Any,
        };

        let child = single_child(document, node)?;
        let value = engine.transform_nested(params, child, declared.clone())?;
        check_declared(document, child, &declared, params.target(), &value)?;
        Ok(value)
    }
}

/// `<null/>`
pub struct NullRule;

impl TransformationRule<XmlToObject> for NullRule {
    fn name(&self) -> &str {
        NULL
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, NULL)
    }

    fn transform(&self, _params: &mut Params<'_>, _engine: &Engine) -> Result<Value> {
        Ok(Value::Null)
    }
}

/// `<boolean|integer|float|string value="..."/>`
pub struct ScalarRule;

impl TransformationRule<XmlToObject> for ScalarRule {
    fn name(&self) -> &str {
        "scalar"
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        matches!(
            params.source().name(*params.subject()),
            Some(BOOLEAN | INTEGER | FLOAT | STRING)
        )
    }

    fn transform(&self, params: &mut Params<'_>, _engine: &Engine) -> Result<Value> {
        let document = params.source();
        let node = *params.subject();
        let text = document.required_attribute(node, VALUE)?;
        let invalid = |kind: &str| {
            Error::malformed_at(format!("'{text}' is not a valid {kind}"), describe(document, node))
        };

        let value = match document.name(node) {
            Some(BOOLEAN) => Value::Boolean(text.parse().map_err(|_| invalid(BOOLEAN))?),
            Some(INTEGER) => Value::Integer(text.parse().map_err(|_| invalid(INTEGER))?),
            Some(FLOAT) => Value::Float(text.parse().map_err(|_| invalid(FLOAT))?),
            _ => Value::String(text.to_string()),
        };

        register(params, &value)?;
        Ok(value)
    }
}

/// `<list id="N">items</list>`
pub struct ListRule;

impl TransformationRule<XmlToObject> for ListRule {
    fn name(&self) -> &str {
        LIST
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, LIST)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<Value> {
        let document = params.source();
        let list = params.target_mut().add_list(Vec::new());
        register(params, &list)?;

        let Some(id) = list.as_object() else {
            return Err(Error::malformed("list allocation did not yield an object"));
        };
        for child in document.element_children(*params.subject()) {
            let item = engine.transform_nested(params, child, DeclaredType::Any)?;
            params.target_mut().push_item(id, item)?;
        }
        Ok(list)
    }
}

/// `<map id="N"><entry key="k">value</entry></map>`
pub struct MapRule;

impl TransformationRule<XmlToObject> for MapRule {
    fn name(&self) -> &str {
        MAP
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, MAP)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<Value> {
        let document = params.source();
        let map = params.target_mut().add_map(BTreeMap::new());
        register(params, &map)?;

        let Some(id) = map.as_object() else {
            return Err(Error::malformed("map allocation did not yield an object"));
        };
        for entry in document.element_children(*params.subject()) {
            if document.name(entry) != Some(ENTRY) {
                return Err(Error::malformed_at(
                    format!("expected <{ENTRY}> inside <{MAP}>"),
                    describe(document, entry),
                ));
            }
            let key = document.required_attribute(entry, KEY)?;
            let child = single_child(document, entry)?;
            let value = engine.transform_nested(params, child, DeclaredType::Any)?;
            params.target_mut().insert_entry(id, key, value)?;
        }
        Ok(map)
    }
}

/// `<record id="N" type="T"><field name="f" declared-type="d">value</field></record>`
pub struct RecordRule;

impl TransformationRule<XmlToObject> for RecordRule {
    fn name(&self) -> &str {
        RECORD
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, RECORD)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<Value> {
        let document = params.source();
        let node = *params.subject();
        let type_name = document.required_attribute(node, TYPE)?;
        let record = params.target_mut().add_record(type_name, Vec::new());
        register(params, &record)?;

        let Some(id) = record.as_object() else {
            return Err(Error::malformed("record allocation did not yield an object"));
        };
        for slot in document.element_children(node) {
            if document.name(slot) != Some(FIELD) {
                return Err(Error::malformed_at(
                    format!("expected <{FIELD}> inside <{RECORD}>"),
                    describe(document, slot),
                ));
            }
            let name = document.required_attribute(slot, NAME)?;
            let declared: DeclaredType = document.required_attribute(slot, DECLARED_TYPE)?.parse()?;
            let child = single_child(document, slot)?;

            let value = engine.transform_nested(params, child, declared.clone())?;
            check_declared(document, child, &declared, params.target(), &value)?;
            params.target_mut().push_field(id, Field::new(name, declared, value))?;
        }
        Ok(record)
    }
}

/// `<reference ref="N"/>`, resolved through the reference table
pub struct ReferenceRule;

impl TransformationRule<XmlToObject> for ReferenceRule {
    fn name(&self) -> &str {
        REFERENCE
    }

    fn priority(&self) -> i32 {
        REFERENCE_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        element_named(params, REFERENCE)
    }

    fn transform(&self, params: &mut Params<'_>, _engine: &Engine) -> Result<Value> {
        let id = parse_id(params.source(), *params.subject(), REF)?;
        params.state().resolve(id)
    }
}

/// The built-in rules of the "XML" -> "Object" path
pub fn rules() -> Vec<Box<dyn TransformationRule<XmlToObject>>> {
    vec![
        Box::new(ReferenceRule),
        Box::new(ObjectGraphRule),
        Box::new(NullRule),
        Box::new(ScalarRule),
        Box::new(ListRule),
        Box::new(MapRule),
        Box::new(RecordRule),
    ]
}

/// A container holding the built-in decoding rules
pub fn container() -> Result<RulesContainer<XmlToObject>> {
    RulesContainer::builder()
        .register_all(&TransformationPath::xml_to_object(), rules())
        .build()
}

/// An engine with the built-in decoding rules and the default strategy
pub fn decoder() -> Result<Engine> {
    Ok(TransformationFactory::new(container()?))
}

/// Decode a serialized graph into a fresh object graph and its root value
pub fn decode(engine: &Engine, document: &XmlDocument) -> Result<(ObjectGraph, Value)> {
    let root = document
        .document_element()
        .ok_or_else(|| Error::malformed("document has no root element"))?;
    if document.name(root) != Some(OBJECT_GRAPH) {
        return Err(Error::malformed_at(
            format!("expected root element <{OBJECT_GRAPH}>"),
            describe(document, root),
        ));
    }

    let mut graph = ObjectGraph::new();
    let value = engine.transform(&TransformationPath::xml_to_object(), document, &mut graph, root)?;

    debug!(objects = graph.len(), nodes = document.len(), "decoded object graph");
    Ok((graph, value))
}
