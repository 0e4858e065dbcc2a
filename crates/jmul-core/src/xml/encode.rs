//! Object graph to XML rules
//!
//! Every rule builds a detached element and returns it; the caller attaches
//! it. Objects and scalars are registered in the identity cache before their
//! content is written, so any later occurrence (including one reached
//! through a cycle) is written by the reference rule instead.

use super::document::{NodeId, XmlDocument};
use super::*;
use crate::error::{Error, Result};
use crate::object::{DeclaredType, Object, ObjectGraph, Value};
use crate::transformation::{
    Inspected, ObjectIdentityCache, Registration, RulesContainer, TransformationFactory,
    TransformationParameters, TransformationPath, TransformationRule, TransformationScheme,
};
use tracing::debug;

/// Encoding of object graphs into XML documents
pub struct ObjectToXml;

impl TransformationScheme for ObjectToXml {
    type Subject = Value;
    type Source = ObjectGraph;
    type Target = XmlDocument;
    type State = ObjectIdentityCache;
    type Output = NodeId;

    fn runtime_type(subject: &Value, source: &ObjectGraph) -> DeclaredType {
        source.runtime_type(subject)
    }

    fn inspect<'a>(subject: &'a Value, source: &'a ObjectGraph) -> Inspected<'a> {
        Inspected::Value(source, subject)
    }
}

type Params<'a> = TransformationParameters<'a, ObjectToXml>;
/// Engine over the "Object" -> "XML" path
pub type Engine = TransformationFactory<ObjectToXml>;

/// The type a subject is cached under: its declared type, or its runtime
/// type when declared as `any`
fn cache_type(params: &Params<'_>) -> DeclaredType {
    match params.declared_type() {
        DeclaredType::Any => params.source().runtime_type(params.subject()),
        declared => declared.clone(),
    }
}

fn register(params: &mut Params<'_>) -> Registration {
    let declared = cache_type(params);
    let subject = params.subject().clone();
    params.state_mut().add_object(&subject, &declared)
}

fn reference_element(document: &mut XmlDocument, id: u64) -> NodeId {
    let element = document.create_element(REFERENCE);
    document.set_attribute(element, REF, id.to_string());
    element
}

/// Writes subjects that are already in the identity cache as references
pub struct ReferenceRule;

impl TransformationRule<ObjectToXml> for ReferenceRule {
    fn name(&self) -> &str {
        REFERENCE
    }

    fn priority(&self) -> i32 {
        REFERENCE_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        !params.subject().is_null()
            && params
                .state()
                .lookup(params.subject(), &cache_type(params))
                .is_some()
    }

    fn transform(&self, params: &mut Params<'_>, _engine: &Engine) -> Result<NodeId> {
        let id = register(params).id();
        Ok(reference_element(params.target_mut(), id))
    }
}

/// `<null/>`
pub struct NullRule;

impl TransformationRule<ObjectToXml> for NullRule {
    fn name(&self) -> &str {
        NULL
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        params.subject().is_null()
    }

    fn transform(&self, params: &mut Params<'_>, _engine: &Engine) -> Result<NodeId> {
        Ok(params.target_mut().create_element(NULL))
    }
}

/// `<boolean|integer|float|string id="N" value="..."/>`
pub struct ScalarRule;

impl TransformationRule<ObjectToXml> for ScalarRule {
    fn name(&self) -> &str {
        "scalar"
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        matches!(
            params.subject(),
            Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    fn transform(&self, params: &mut Params<'_>, _engine: &Engine) -> Result<NodeId> {
        let (name, text) = match params.subject() {
            Value::Boolean(b) => (BOOLEAN, b.to_string()),
            Value::Integer(i) => (INTEGER, i.to_string()),
            Value::Float(f) => (FLOAT, f.to_string()),
            Value::String(s) => (STRING, s.clone()),
            other => {
                return Err(Error::malformed(format!("{} is not a scalar", other.kind_name())));
            }
        };

        let id = match register(params) {
            Registration::New(id) => id,
            Registration::Known(id) => return Ok(reference_element(params.target_mut(), id)),
        };

        let document = params.target_mut();
        let element = document.create_element(name);
        document.set_attribute(element, ID, id.to_string());
        document.set_attribute(element, VALUE, text);
        Ok(element)
    }
}

/// Matches subjects that refer to an arena object of the given kind
fn object_of_kind(params: &Params<'_>, kind: &str) -> bool {
    params
        .source()
        .resolve(params.subject())
        .is_some_and(|object| object.kind_name() == kind)
}

/// Registers the subject and creates its element, or a reference when the
/// subject was registered in the meantime
fn open_object(params: &mut Params<'_>, name: &str) -> std::result::Result<NodeId, NodeId> {
    match register(params) {
        Registration::New(id) => {
            let document = params.target_mut();
            let element = document.create_element(name);
            document.set_attribute(element, ID, id.to_string());
            Ok(element)
        }
        Registration::Known(id) => Err(reference_element(params.target_mut(), id)),
    }
}

/// `<list id="N">items</list>`
pub struct ListRule;

impl TransformationRule<ObjectToXml> for ListRule {
    fn name(&self) -> &str {
        LIST
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        object_of_kind(params, LIST)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<NodeId> {
        let graph = params.source();
        let Some(Object::List(items)) = graph.resolve(params.subject()) else {
            return Err(Error::malformed("subject is not a list"));
        };
        let element = match open_object(params, LIST) {
            Ok(element) => element,
            Err(reference) => return Ok(reference),
        };

        for item in items {
            let declared = graph.runtime_type(item);
            let child = engine.transform_nested(params, item.clone(), declared)?;
            params.target_mut().append_child(element, child);
        }
        Ok(element)
    }
}

/// `<map id="N"><entry key="k">value</entry></map>`
pub struct MapRule;

impl TransformationRule<ObjectToXml> for MapRule {
    fn name(&self) -> &str {
        MAP
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        object_of_kind(params, MAP)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<NodeId> {
        let graph = params.source();
        let Some(Object::Map(entries)) = graph.resolve(params.subject()) else {
            return Err(Error::malformed("subject is not a map"));
        };
        let element = match open_object(params, MAP) {
            Ok(element) => element,
            Err(reference) => return Ok(reference),
        };

        for (key, value) in entries {
            let declared = graph.runtime_type(value);
            let child = engine.transform_nested(params, value.clone(), declared)?;
            let document = params.target_mut();
            let entry = document.append_element(element, ENTRY);
            document.set_attribute(entry, KEY, key.as_str());
            document.append_child(entry, child);
        }
        Ok(element)
    }
}

/// `<record id="N" type="T"><field name="f" declared-type="d">value</field></record>`
pub struct RecordRule;

impl TransformationRule<ObjectToXml> for RecordRule {
    fn name(&self) -> &str {
        RECORD
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn is_applicable(&self, params: &Params<'_>) -> bool {
        object_of_kind(params, RECORD)
    }

    fn transform(&self, params: &mut Params<'_>, engine: &Engine) -> Result<NodeId> {
        let graph = params.source();
        let Some(Object::Record { type_name, fields }) = graph.resolve(params.subject()) else {
            return Err(Error::malformed("subject is not a record"));
        };
        let element = match open_object(params, RECORD) {
            Ok(element) => element,
            Err(reference) => return Ok(reference),
        };
        params.target_mut().set_attribute(element, TYPE, type_name.as_str());

        for field in fields {
            let runtime = graph.runtime_type(&field.value);
            if !field.declared_type.accepts(&runtime) {
                return Err(Error::malformed_at(
                    format!(
                        "field '{}' is declared as {} but holds a {runtime}",
                        field.name, field.declared_type
                    ),
                    format!("record {type_name}"),
                ));
            }

            let child = engine.transform_nested(params, field.value.clone(), field.declared_type.clone())?;
            let document = params.target_mut();
            let slot = document.append_element(element, FIELD);
            document.set_attribute(slot, NAME, field.name.as_str());
            document.set_attribute(slot, DECLARED_TYPE, field.declared_type.to_string());
            document.append_child(slot, child);
        }
        Ok(element)
    }
}

/// The built-in rules of the "Object" -> "XML" path
pub fn rules() -> Vec<Box<dyn TransformationRule<ObjectToXml>>> {
    vec![
        Box::new(ReferenceRule),
        Box::new(NullRule),
        Box::new(ScalarRule),
        Box::new(ListRule),
        Box::new(MapRule),
        Box::new(RecordRule),
    ]
}

/// A container holding the built-in encoding rules
pub fn container() -> Result<RulesContainer<ObjectToXml>> {
    RulesContainer::builder()
        .register_all(&TransformationPath::object_to_xml(), rules())
        .build()
}

/// An engine with the built-in encoding rules and the default strategy
pub fn encoder() -> Result<Engine> {
    Ok(TransformationFactory::new(container()?))
}

/// Encode the graph reachable from `root`, declared as its runtime type
pub fn encode(engine: &Engine, graph: &ObjectGraph, root: &Value) -> Result<XmlDocument> {
    encode_declared(engine, graph, root, graph.runtime_type(root))
}

/// Encode the graph reachable from `root` under an explicit declared type
pub fn encode_declared(
    engine: &Engine,
    graph: &ObjectGraph,
    root: &Value,
    declared_type: DeclaredType,
) -> Result<XmlDocument> {
    let runtime = graph.runtime_type(root);
    if !declared_type.accepts(&runtime) {
        return Err(Error::malformed(format!(
            "root is declared as {declared_type} but is a {runtime}"
        )));
    }

    let mut document = XmlDocument::new();
    let top = document.append_element(document.root(), OBJECT_GRAPH);
    document.set_attribute(top, DECLARED_TYPE, declared_type.to_string());

    let node = engine.transform_declared(
        &TransformationPath::object_to_xml(),
        graph,
        &mut document,
        root.clone(),
        declared_type,
    )?;
    document.append_child(top, node);

    debug!(objects = graph.len(), nodes = document.len(), "encoded object graph");
    Ok(document)
}
