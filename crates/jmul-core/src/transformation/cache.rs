//! Per-call registries of visited subjects
//!
//! [`ObjectIdentityCache`] is used while encoding: it hands out an id for
//! every distinct (value, declared type) pair so later occurrences can be
//! written as references. Arena objects are told apart by identity and
//! scalars by value. [`ReferenceTable`] is its decoding counterpart and
//! maps those ids back to values.
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::object::{DeclaredType, ObjectId, Value};
use std::collections::HashMap;
use tracing::trace;

/// The id assigned to the first registered entry
pub const FIRST_ID: u64 = 1;

/// A value together with the type it was declared as
///
/// Entries holding arena objects are equal only when they refer to the same
/// object. Scalar entries compare by value, floats bitwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    value: Value,
    declared_type: DeclaredType,
}

impl CacheEntry {
    pub fn new(value: Value, declared_type: DeclaredType) -> Self {
        Self { value, declared_type }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    /// Cache equality of two entries
    pub fn matches(&self, other: &CacheEntry) -> bool {
        self.declared_type == other.declared_type && self.key() == other.key()
    }

    fn key(&self) -> Key {
        Key::of(&self.value)
    }
}

/// Outcome of [`ObjectIdentityCache::add_object`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The entry was not known and received this id
    New(u64),
    /// The entry was registered earlier under this id
    Known(u64),
}

impl Registration {
    pub fn id(self) -> u64 {
        match self {
            Registration::New(id) | Registration::Known(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Registration::New(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    String(String),
    Object(ObjectId),
}

impl Key {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Key::Null,
            Value::Boolean(b) => Key::Boolean(*b),
            Value::Integer(i) => Key::Integer(*i),
            Value::Float(f) => Key::Float(f.to_bits()),
            Value::String(s) => Key::String(s.clone()),
            Value::Ref(id) => Key::Object(*id),
        }
    }
}

/// Registry of the subjects visited during one encoding call
#[derive(Debug)]
pub struct ObjectIdentityCache {
    entries: HashMap<(Key, DeclaredType), u64>,
    next_id: u64,
}

impl Default for ObjectIdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectIdentityCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: FIRST_ID,
        }
    }

    /// Register a value, or return the id it was registered under before
    pub fn add_object(&mut self, value: &Value, declared_type: &DeclaredType) -> Registration {
        if let Some(id) = self.lookup(value, declared_type) {
            trace!(id, declared_type = %declared_type, "cache hit");
            return Registration::Known(id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert((Key::of(value), declared_type.clone()), id);

        trace!(id, declared_type = %declared_type, kind = value.kind_name(), "cache registration");
        Registration::New(id)
    }

    /// The id of a registered value, without registering it
    pub fn lookup(&self, value: &Value, declared_type: &DeclaredType) -> Option<u64> {
        self.entries.get(&(Key::of(value), declared_type.clone())).copied()
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The id the next new entry will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

/// Maps ids read from a serialized graph back to values
#[derive(Debug, Default)]
pub struct ReferenceTable {
    values: HashMap<u64, Value>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value behind an id; every id may be defined only once
    pub fn register(&mut self, id: u64, value: Value) -> Result<()> {
        if self.values.contains_key(&id) {
            return Err(Error::malformed(format!("object id {id} is defined more than once")));
        }
        trace!(id, kind = value.kind_name(), "reference registration");
        self.values.insert(id, value);
        Ok(())
    }

    /// The value registered under `id`
    pub fn resolve(&self, id: u64) -> Result<Value> {
        self.values
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::malformed(format!("reference to unknown object id {id}")))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
