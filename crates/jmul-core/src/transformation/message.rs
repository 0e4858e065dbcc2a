//! Diagnostic descriptions of transformation subjects
//!
//! Error messages must never dump a whole document or object graph, so
//! subjects are described through a chain of [`MessageCreator`]s. Creators
//! are tried in registration order; the first one whose parent kind the
//! subject is assignable to produces the description.
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::object::{Object, ObjectGraph, Value};
use crate::xml::{NodeId, XmlDocument};
use std::fmt;

/// Kind of a subject, used for the assignability check of creators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    /// Parent of every kind
    Any,
    /// An XML document node
    Document,
    /// Any XML node; documents are nodes too
    Node,
    /// A value of an object graph
    Value,
    /// The absent value
    Null,
}

impl SubjectKind {
    /// Whether a subject of this kind may be treated as `parent`
    pub fn is_assignable_to(self, parent: SubjectKind) -> bool {
        match parent {
            SubjectKind::Any => true,
            SubjectKind::Node => matches!(self, SubjectKind::Node | SubjectKind::Document),
            other => self == other,
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubjectKind::Any => "any",
            SubjectKind::Document => "document",
            SubjectKind::Node => "node",
            SubjectKind::Value => "value",
            SubjectKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// A subject together with the structure it lives in
#[derive(Debug, Clone, Copy)]
pub enum Inspected<'a> {
    Document(&'a XmlDocument),
    Node(&'a XmlDocument, NodeId),
    Value(&'a ObjectGraph, &'a Value),
    /// A subject outside of any known structure, described by its debug form
    Opaque(&'a dyn fmt::Debug),
    Null,
}

impl Inspected<'_> {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Inspected::Document(_) => SubjectKind::Document,
            Inspected::Node(document, node) if document.is_document(*node) => SubjectKind::Document,
            Inspected::Node(..) => SubjectKind::Node,
            Inspected::Value(_, value) if value.is_null() => SubjectKind::Null,
            Inspected::Value(..) | Inspected::Opaque(_) => SubjectKind::Value,
            Inspected::Null => SubjectKind::Null,
        }
    }
}

/// One link of the description chain
pub trait MessageCreator: Send + Sync {
    /// The kind of subject this creator describes
    fn parent_kind(&self) -> SubjectKind;

    fn is_applicable(&self, subject: &Inspected<'_>) -> bool {
        subject.kind().is_assignable_to(self.parent_kind())
    }

    fn create_message(&self, subject: &Inspected<'_>) -> String;
}

/// Describes whole XML documents by their root element
pub struct DocumentMessageCreator;

impl MessageCreator for DocumentMessageCreator {
    fn parent_kind(&self) -> SubjectKind {
        SubjectKind::Document
    }

    fn create_message(&self, subject: &Inspected<'_>) -> String {
        let document = match subject {
            Inspected::Document(document) | Inspected::Node(document, _) => *document,
            _ => return GenericMessageCreator.create_message(subject),
        };
        match document.document_element().and_then(|root| document.name(root)) {
            Some(name) => format!("XML document (root element <{name}>)"),
            None => "empty XML document".to_string(),
        }
    }
}

/// Describes single XML nodes by name and position
pub struct NodeMessageCreator;

impl MessageCreator for NodeMessageCreator {
    fn parent_kind(&self) -> SubjectKind {
        SubjectKind::Node
    }

    fn create_message(&self, subject: &Inspected<'_>) -> String {
        let Inspected::Node(document, node) = subject else {
            return GenericMessageCreator.create_message(subject);
        };
        match (document.name(*node), document.text(*node)) {
            (Some(name), _) => format!(
                "XML element <{name}> (node {}, {} children)",
                node.index(),
                document.children(*node).len()
            ),
            (None, Some(text)) => format!("XML text node ({} bytes)", text.len()),
            (None, None) => format!("XML node {}", node.index()),
        }
    }
}

/// Fallback creator accepting every subject, null included
pub struct GenericMessageCreator;

impl MessageCreator for GenericMessageCreator {
    fn parent_kind(&self) -> SubjectKind {
        SubjectKind::Any
    }

    fn create_message(&self, subject: &Inspected<'_>) -> String {
        match subject {
            Inspected::Null => "null".to_string(),
            Inspected::Document(_) => "XML document".to_string(),
            Inspected::Node(_, node) => format!("XML node {}", node.index()),
            Inspected::Opaque(debug) => {
                let mut text = format!("{debug:?}");
                if text.len() > MAX_OPAQUE_LENGTH {
                    let cut = (0..=MAX_OPAQUE_LENGTH)
                        .rev()
                        .find(|i| text.is_char_boundary(*i))
                        .unwrap_or(0);
                    text.truncate(cut);
                    text.push_str("...");
                }
                text
            }
            Inspected::Value(graph, value) => describe_value(graph, value),
        }
    }
}

const MAX_OPAQUE_LENGTH: usize = 64;

fn describe_value(graph: &ObjectGraph, value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => format!("boolean {b}"),
        Value::Integer(i) => format!("integer {i}"),
        Value::Float(f) => format!("float {f}"),
        Value::String(s) => format!("string ({} chars)", s.chars().count()),
        Value::Ref(id) => match graph.get(*id) {
            Some(Object::List(items)) => format!("list {id} ({} items)", items.len()),
            Some(Object::Map(entries)) => format!("map {id} ({} entries)", entries.len()),
            Some(Object::Record { type_name, fields }) => {
                format!("record {type_name} {id} ({} fields)", fields.len())
            }
            None => format!("dangling reference {id}"),
        },
    }
}

/// Ordered chain of message creators
pub struct MessageFactory {
    creators: Vec<Box<dyn MessageCreator>>,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFactory {
    /// The standard chain: document, node, generic fallback
    pub fn new() -> Self {
        Self::empty()
            .with_creator(DocumentMessageCreator)
            .with_creator(NodeMessageCreator)
            .with_creator(GenericMessageCreator)
    }

    /// A chain with no creators at all
    pub fn empty() -> Self {
        Self { creators: Vec::new() }
    }

    /// Append a creator; it is tried after every creator added before it
    pub fn with_creator(mut self, creator: impl MessageCreator + 'static) -> Self {
        self.creators.push(Box::new(creator));
        self
    }

    /// Describe a subject with the first applicable creator
    pub fn describe(&self, subject: &Inspected<'_>) -> Result<String> {
        self.creators
            .iter()
            .find(|creator| creator.is_applicable(subject))
            .map(|creator| creator.create_message(subject))
            .ok_or(Error::NoMessageCreator { kind: subject.kind() })
    }

    /// Describe a subject, falling back to its kind when no creator applies
    pub fn describe_or_kind(&self, subject: &Inspected<'_>) -> String {
        self.describe(subject)
            .unwrap_or_else(|_| format!("{} subject", subject.kind()))
    }
}
