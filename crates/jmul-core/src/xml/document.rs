//! Arena-based XML document model
//!
//! Nodes are addressed by [`NodeId`]; node 0 is always the document node.
//! Parsing and writing go through `quick-xml`.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Index of a node inside its [`XmlDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node holds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct XmlNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable XML tree
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![XmlNode {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The first element below the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    /// Number of nodes, including the document node
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn is_document(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Document))
    }

    /// Element name, or `None` for document and text nodes
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Element { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child nodes that are elements
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(move |child| self.name(*child).is_some())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Like [`XmlDocument::attribute`] but fails when the attribute is missing
    pub fn required_attribute(&self, node: NodeId, name: &str) -> Result<&str> {
        self.attribute(node, name).ok_or_else(|| {
            Error::malformed(format!(
                "element <{}> is missing attribute '{name}'",
                self.name(node).unwrap_or("?")
            ))
        })
    }

    /// Create an element that is not yet attached to the tree
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    /// Attach `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        if let Some(previous) = self.nodes[child.0].parent.take() {
            self.nodes[previous.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Create an element and attach it below `parent`
    pub fn append_element(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let element = self.create_element(name);
        self.append_child(parent, element);
        element
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let node = self.push(NodeKind::Text(text.into()));
        self.append_child(parent, node);
        node
    }

    /// Set an attribute, replacing an existing value of the same name
    pub fn set_attribute(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(XmlNode {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            let name = name.into();
            let value = value.into();
            match attributes.iter_mut().find(|(key, _)| *key == name) {
                Some(existing) => existing.1 = value,
                None => attributes.push((name, value)),
            }
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(XmlNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Parse XML text into a document
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = true;
        reader.config_mut().trim_text_end = true;

        let mut document = XmlDocument::new();
        let mut stack = vec![document.root()];

        loop {
            let position = reader.buffer_position() as u64;
            let parent = stack.last().copied().unwrap_or(NodeId(0));

            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = document.element_from_start(&e, position)?;
                    document.append_child(parent, element);
                    stack.push(element);
                }
                Ok(Event::Empty(e)) => {
                    let element = document.element_from_start(&e, position)?;
                    document.append_child(parent, element);
                }
                Ok(Event::End(e)) => {
                    if stack.len() <= 1 {
                        return Err(Error::Xml {
                            message: format!(
                                "unexpected closing tag </{}>",
                                String::from_utf8_lossy(e.name().as_ref())
                            ),
                            position: Some(position),
                        });
                    }
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| Error::Xml {
                        message: format!("invalid text content: {err}"),
                        position: Some(position),
                    })?;
                    if !text.trim().is_empty() && parent != document.root() {
                        document.append_text(parent, text.into_owned());
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    document.append_text(parent, text);
                }
                // Declarations, comments, processing instructions and doctypes carry no data
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(Error::Xml {
                        message: err.to_string(),
                        position: Some(reader.error_position() as u64),
                    });
                }
            }
        }

        if stack.len() > 1 {
            let open = stack
                .last()
                .and_then(|node| document.name(*node))
                .unwrap_or("?")
                .to_string();
            return Err(Error::Xml {
                message: format!("unexpected end of input, expected closing tag </{open}>"),
                position: Some(source.len() as u64),
            });
        }

        if document.document_element().is_none() {
            return Err(Error::xml("empty document: no root element found"));
        }

        Ok(document)
    }

    fn element_from_start(&mut self, start: &BytesStart<'_>, position: u64) -> Result<NodeId> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let element = self.create_element(name);

        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| Error::Xml {
                message: format!("invalid attribute: {err}"),
                position: Some(position),
            })?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(|err| Error::Xml {
                message: format!("invalid attribute value: {err}"),
                position: Some(position),
            })?;
            self.set_attribute(element, key, value.into_owned());
        }

        Ok(element)
    }

    /// Serialize the document, indenting by two spaces when `pretty` is set
    pub fn to_xml_string(&self, pretty: bool) -> Result<String> {
        let mut writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|err| Error::xml(err.to_string()))?;
        for child in self.children(self.root()) {
            self.write_node(&mut writer, *child)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|err| Error::xml(err.to_string()))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: NodeId) -> Result<()> {
        let children = self.children(node);
        let event_result = match self.kind(node) {
            Some(NodeKind::Element { name, attributes }) => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if children.is_empty() {
                    writer.write_event(Event::Empty(start))
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|err| Error::xml(err.to_string()))?;
                    for child in children {
                        self.write_node(writer, *child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))
                }
            }
            Some(NodeKind::Text(text)) => writer.write_event(Event::Text(BytesText::new(text))),
            Some(NodeKind::Document) | None => return Ok(()),
        };
        event_result.map_err(|err| Error::xml(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_query() {
        let mut doc = XmlDocument::new();
        let root = doc.append_element(doc.root(), "object-graph");
        let list = doc.append_element(root, "list");
        doc.set_attribute(list, "id", "1");
        doc.set_attribute(list, "id", "2");
        doc.append_text(list, "hello");

        assert_eq!(doc.document_element(), Some(root));
        assert_eq!(doc.name(list), Some("list"));
        assert_eq!(doc.attribute(list, "id"), Some("2"));
        assert_eq!(doc.parent(list), Some(root));
        assert_eq!(doc.element_children(list).count(), 0);
        assert_eq!(doc.children(list).len(), 1);
        assert!(doc.required_attribute(list, "ref").is_err());
    }

    #[test]
    fn test_append_moves_detached_node() {
        let mut doc = XmlDocument::new();
        let a = doc.append_element(doc.root(), "a");
        let b = doc.append_element(a, "b");
        let c = doc.create_element("c");
        doc.append_child(a, c);
        doc.append_child(b, c);

        assert_eq!(doc.children(a), &[b]);
        assert_eq!(doc.children(b), &[c]);
    }

    #[test]
    fn test_write_compact() {
        let mut doc = XmlDocument::new();
        let root = doc.append_element(doc.root(), "root");
        let child = doc.append_element(root, "string");
        doc.set_attribute(child, "value", "a \"quoted\" <tag> & more");

        let xml = doc.to_xml_string(false).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<root><string value=\"a &quot;quoted&quot; &lt;tag&gt; &amp; more\"/></root>"));
    }

    #[test]
    fn test_parse_written_document() {
        let mut doc = XmlDocument::new();
        let root = doc.append_element(doc.root(), "root");
        let child = doc.append_element(root, "string");
        doc.set_attribute(child, "value", "line one\nline <two>");
        doc.append_element(root, "null");

        let parsed = XmlDocument::parse(&doc.to_xml_string(true).unwrap()).unwrap();
        let parsed_root = parsed.document_element().unwrap();
        let children: Vec<_> = parsed.element_children(parsed_root).collect();

        assert_eq!(parsed.name(parsed_root), Some("root"));
        assert_eq!(children.len(), 2);
        assert_eq!(parsed.attribute(children[0], "value"), Some("line one\nline <two>"));
        assert_eq!(parsed.name(children[1]), Some("null"));
    }

    #[test]
    fn test_parse_text_content() {
        let doc = XmlDocument::parse("<note>  remember &amp; smile  </note>").unwrap();
        let note = doc.document_element().unwrap();
        let text = doc.children(note)[0];
        assert_eq!(doc.text(text), Some("remember & smile"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(XmlDocument::parse("").is_err());
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a>").is_err());
    }
}
