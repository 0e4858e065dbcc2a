//! XML representation of object graphs
//!
//! The format is nested: every object is written in place the first time it
//! is met, carrying an `id` attribute. Later occurrences of the same cache
//! entry are written as `<reference ref="N"/>`.
//!
//! ```xml
//! <object-graph declared-type="list">
//!   <list id="1">
//!     <integer id="2" value="7"/>
//!     <reference ref="1"/>
//!   </list>
//! </object-graph>
//! ```

pub mod decode;
pub mod document;
pub mod encode;

pub use decode::{decode, decoder, Engine as Decoder, XmlToObject};
pub use document::{NodeId, NodeKind, XmlDocument};
pub use encode::{encode, encode_declared, encoder, Engine as Encoder, ObjectToXml};

/// Root element of a serialized graph
pub const OBJECT_GRAPH: &str = "object-graph";
pub const NULL: &str = "null";
pub const BOOLEAN: &str = "boolean";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const STRING: &str = "string";
pub const LIST: &str = "list";
pub const MAP: &str = "map";
pub const ENTRY: &str = "entry";
pub const RECORD: &str = "record";
pub const FIELD: &str = "field";
pub const REFERENCE: &str = "reference";

pub const ID: &str = "id";
pub const REF: &str = "ref";
pub const VALUE: &str = "value";
pub const KEY: &str = "key";
pub const TYPE: &str = "type";
pub const NAME: &str = "name";
pub const DECLARED_TYPE: &str = "declared-type";

/// Default priority of the built-in rules
pub const DEFAULT_PRIORITY: i32 = 10;

/// Priority of the reference rules; preferred over everything else
pub const REFERENCE_PRIORITY: i32 = 0;
