//! Arena-backed object graphs
//!
//! Objects live in an [`ObjectGraph`] and are referenced by [`ObjectId`].
//! A [`Value`] is either a scalar or a reference into the arena, so shared
//! and cyclic structures are expressed by repeating an id rather than by
//! owning pointers.

mod declared;
mod json;

pub use declared::DeclaredType;

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Index of an object inside its [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Position of the object in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scalar or a reference to an arena object
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Ref(ObjectId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The referenced object id, if this value points into the arena
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Ref(_) => "reference",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Ref(id)
    }
}

/// A named, typed slot of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub declared_type: DeclaredType,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            value: value.into(),
        }
    }
}

/// An object stored in the arena
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Record { type_name: String, fields: Vec<Field> },
}

impl Object {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Object::List(_) => "list",
            Object::Map(_) => "map",
            Object::Record { .. } => "record",
        }
    }

    /// The type this object has at runtime
    pub fn runtime_type(&self) -> DeclaredType {
        match self {
            Object::List(_) => DeclaredType::List,
            Object::Map(_) => DeclaredType::Map,
            Object::Record { type_name, .. } => DeclaredType::Record(type_name.clone()),
        }
    }

    /// Number of items, entries or fields
    pub fn len(&self) -> usize {
        match self {
            Object::List(items) => items.len(),
            Object::Map(entries) => entries.len(),
            Object::Record { fields, .. } => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena of objects forming one (possibly cyclic) graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGraph {
    objects: Vec<Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object and return a reference to it
    pub fn insert(&mut self, object: Object) -> Value {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        Value::Ref(id)
    }

    pub fn add_list(&mut self, items: Vec<Value>) -> Value {
        self.insert(Object::List(items))
    }

    pub fn add_map(&mut self, entries: BTreeMap<String, Value>) -> Value {
        self.insert(Object::Map(entries))
    }

    pub fn add_record(&mut self, type_name: impl Into<String>, fields: Vec<Field>) -> Value {
        self.insert(Object::Record {
            type_name: type_name.into(),
            fields,
        })
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.0)
    }

    /// Like [`ObjectGraph::get`] but fails on a dangling id
    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.get(id)
            .ok_or_else(|| Error::malformed(format!("dangling object reference {id}")))
    }

    /// Dereference a value that must point to an object
    pub fn resolve(&self, value: &Value) -> Option<&Object> {
        value.as_object().and_then(|id| self.get(id))
    }

    /// Append an item to a list object
    pub fn push_item(&mut self, list: ObjectId, item: Value) -> Result<()> {
        match self.get_mut(list) {
            Some(Object::List(items)) => {
                items.push(item);
                Ok(())
            }
            Some(other) => Err(Error::malformed(format!(
                "object {list} is a {}, not a list",
                other.kind_name()
            ))),
            None => Err(Error::malformed(format!("dangling object reference {list}"))),
        }
    }

    /// Insert or replace an entry of a map object
    pub fn insert_entry(&mut self, map: ObjectId, key: impl Into<String>, value: Value) -> Result<()> {
        match self.get_mut(map) {
            Some(Object::Map(entries)) => {
                entries.insert(key.into(), value);
                Ok(())
            }
            Some(other) => Err(Error::malformed(format!(
                "object {map} is a {}, not a map",
                other.kind_name()
            ))),
            None => Err(Error::malformed(format!("dangling object reference {map}"))),
        }
    }

    /// Append a field to a record object
    pub fn push_field(&mut self, record: ObjectId, field: Field) -> Result<()> {
        match self.get_mut(record) {
            Some(Object::Record { fields, .. }) => {
                fields.push(field);
                Ok(())
            }
            Some(other) => Err(Error::malformed(format!(
                "object {record} is a {}, not a record",
                other.kind_name()
            ))),
            None => Err(Error::malformed(format!("dangling object reference {record}"))),
        }
    }

    /// Set the value of an existing record field
    pub fn set_field(&mut self, record: ObjectId, name: &str, value: Value) -> Result<()> {
        let fields = match self.get_mut(record) {
            Some(Object::Record { fields, .. }) => fields,
            _ => return Err(Error::malformed(format!("object {record} is not a record"))),
        };
        let field = fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::malformed(format!("record {record} has no field '{name}'")))?;
        field.value = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The runtime type of a value; null and dangling references are `Any`
    pub fn runtime_type(&self, value: &Value) -> DeclaredType {
        match value {
            Value::Null => DeclaredType::Any,
            Value::Boolean(_) => DeclaredType::Boolean,
            Value::Integer(_) => DeclaredType::Integer,
            Value::Float(_) => DeclaredType::Float,
            Value::String(_) => DeclaredType::String,
            Value::Ref(id) => self
                .get(*id)
                .map(Object::runtime_type)
                .unwrap_or(DeclaredType::Any),
        }
    }
}
