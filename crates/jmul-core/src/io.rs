//! Reading and writing serialized graphs on disk

use crate::error::{Error, Result};
use crate::object::{ObjectGraph, Value};
use crate::xml::{self, XmlDocument};
use std::fs;
use std::path::Path;
use tracing::info;

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and parse an XML document
pub fn read_document(path: impl AsRef<Path>) -> Result<XmlDocument> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    XmlDocument::parse(&text)
}

/// Write an XML document, replacing the file if it exists
pub fn write_document(path: impl AsRef<Path>, document: &XmlDocument, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let text = document.to_xml_string(pretty)?;
    fs::write(path, text).map_err(|e| io_error(path, e))?;
    info!(path = %path.display(), nodes = document.len(), "wrote XML document");
    Ok(())
}

/// Encode a graph with the built-in rules and write it to `path`
pub fn encode_to_file(path: impl AsRef<Path>, graph: &ObjectGraph, root: &Value, pretty: bool) -> Result<()> {
    let engine = xml::encoder()?;
    let document = xml::encode(&engine, graph, root)?;
    write_document(path, &document, pretty)
}

/// Read `path` and decode it with the built-in rules
pub fn decode_from_file(path: impl AsRef<Path>) -> Result<(ObjectGraph, Value)> {
    let document = read_document(path)?;
    let engine = xml::decoder()?;
    xml::decode(&engine, &document)
}

/// Read a JSON file
pub fn read_json(path: impl AsRef<Path>) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
