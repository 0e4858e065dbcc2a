//! Bridge between object graphs and JSON documents
//!
//! JSON has no notion of shared references, so the export marks every object
//! that is reachable more than once with a `$id` and writes later occurrences
//! as `{"$ref": <id>}`. Lists that need an id are wrapped as
//! `{"$id": n, "$items": [...]}`; records carry their type under `$type`.
//!
//! Map keys and field names starting with `$` are written with one more
//! leading `$` and read back with one less, so they never collide with the
//! markers.

use super::{DeclaredType, Field, Object, ObjectGraph, ObjectId, Value};
use crate::error::{Error, Result};
use serde_json::{Map, Number};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const ID_KEY: &str = "$id";
pub const REF_KEY: &str = "$ref";
pub const TYPE_KEY: &str = "$type";
pub const ITEMS_KEY: &str = "$items";

impl ObjectGraph {
    /// Build a new graph from a JSON document
    pub fn from_json(json: &serde_json::Value) -> Result<(ObjectGraph, Value)> {
        let mut graph = ObjectGraph::new();
        let root = graph.import_json(json)?;
        Ok((graph, root))
    }

    /// Import a JSON document into this graph
    ///
    /// Arrays become lists and objects become maps, or records when they
    /// carry `$type`. The markers written by [`ObjectGraph::to_json`] are
    /// honored: a `$ref` may name a `$id` anywhere in the document.
    pub fn import_json(&mut self, json: &serde_json::Value) -> Result<Value> {
        let mut definitions = HashMap::new();
        collect_definitions(json, &mut definitions)?;

        let mut importer = Importer {
            graph: self,
            definitions,
            imported: HashMap::new(),
        };
        importer.value(json)
    }

    /// Export the graph reachable from `root` as JSON
    pub fn to_json(&self, root: &Value) -> serde_json::Value {
        let shared = self.shared_objects(root);
        let mut emitted = HashSet::new();
        self.export_value(root, &shared, &mut emitted)
    }

    /// Objects reachable from `root` through more than one reference
    fn shared_objects(&self, root: &Value) -> HashSet<ObjectId> {
        let mut counts: HashMap<ObjectId, usize> = HashMap::new();
        let mut pending: Vec<ObjectId> = root.as_object().into_iter().collect();

        while let Some(id) = pending.pop() {
            let count = counts.entry(id).or_insert(0);
            *count += 1;
            if *count > 1 {
                continue;
            }
            if let Some(object) = self.get(id) {
                pending.extend(children(object).filter_map(Value::as_object));
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect()
    }

    fn export_value(
        &self,
        value: &Value,
        shared: &HashSet<ObjectId>,
        emitted: &mut HashSet<ObjectId>,
    ) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Ref(id) => {
                if !emitted.insert(*id) {
                    return reference(*id);
                }
                match self.get(*id) {
                    Some(object) => self.export_object(*id, object, shared, emitted),
                    None => serde_json::Value::Null,
                }
            }
        }
    }

    fn export_object(
        &self,
        id: ObjectId,
        object: &Object,
        shared: &HashSet<ObjectId>,
        emitted: &mut HashSet<ObjectId>,
    ) -> serde_json::Value {
        let mut map = Map::new();
        if shared.contains(&id) {
            map.insert(ID_KEY.to_string(), serde_json::Value::from(id.index()));
        }

        match object {
            Object::List(items) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|item| self.export_value(item, shared, emitted))
                    .collect();
                if map.is_empty() {
                    return serde_json::Value::Array(items);
                }
                map.insert(ITEMS_KEY.to_string(), serde_json::Value::Array(items));
            }
            Object::Map(entries) => {
                for (key, value) in entries {
                    let exported = self.export_value(value, shared, emitted);
                    map.insert(escape_key(key), exported);
                }
            }
            Object::Record { type_name, fields } => {
                map.insert(TYPE_KEY.to_string(), serde_json::Value::String(type_name.clone()));
                for field in fields {
                    let exported = self.export_value(&field.value, shared, emitted);
                    map.insert(escape_key(&field.name), exported);
                }
            }
        }

        serde_json::Value::Object(map)
    }
}

/// Index every `$id`-marked object of the document
fn collect_definitions<'j>(
    json: &'j serde_json::Value,
    definitions: &mut HashMap<u64, &'j serde_json::Value>,
) -> Result<()> {
    match json {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_definitions(item, definitions)?;
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(marker) = map.get(ID_KEY) {
                let id = marker_id(marker, ID_KEY)?;
                if definitions.insert(id, json).is_some() {
                    return Err(Error::malformed(format!("{ID_KEY} {id} is defined twice")));
                }
            }
            for (key, value) in map {
                if key != ID_KEY && key != REF_KEY {
                    collect_definitions(value, definitions)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn marker_id(value: &serde_json::Value, key: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| Error::malformed(format!("{key} must be a non-negative integer, got {value}")))
}

/// One import pass; `$id`s map to arena objects as they are created
struct Importer<'g, 'j> {
    graph: &'g mut ObjectGraph,
    definitions: HashMap<u64, &'j serde_json::Value>,
    imported: HashMap<u64, ObjectId>,
}

impl<'j> Importer<'_, 'j> {
    fn value(&mut self, json: &'j serde_json::Value) -> Result<Value> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let list = self.allocate(Object::List(Vec::with_capacity(items.len())), None);
                self.items(list, items)?;
                Value::Ref(list)
            }
            serde_json::Value::Object(map) => {
                if let Some(marker) = map.get(REF_KEY) {
                    if map.len() != 1 {
                        return Err(Error::malformed(format!("{REF_KEY} must be the only key of its object")));
                    }
                    return self.resolve(marker_id(marker, REF_KEY)?);
                }
                let marker = map.get(ID_KEY).map(|id| marker_id(id, ID_KEY)).transpose()?;
                if let Some(existing) = marker.and_then(|id| self.imported.get(&id)) {
                    return Ok(Value::Ref(*existing));
                }
                Value::Ref(self.object(map, marker)?)
            }
        })
    }

    /// The object a `$ref` names, importing its definition on first use
    fn resolve(&mut self, id: u64) -> Result<Value> {
        if let Some(existing) = self.imported.get(&id) {
            return Ok(Value::Ref(*existing));
        }
        match self.definitions.get(&id).copied() {
            Some(definition) => self.value(definition),
            None => Err(Error::malformed(format!("{REF_KEY} {id} names no {ID_KEY}"))),
        }
    }

    fn object(&mut self, map: &'j Map<String, serde_json::Value>, marker: Option<u64>) -> Result<ObjectId> {
        if let Some(items) = map.get(ITEMS_KEY) {
            let items = items
                .as_array()
                .ok_or_else(|| Error::malformed(format!("{ITEMS_KEY} must be an array")))?;
            let list = self.allocate(Object::List(Vec::with_capacity(items.len())), marker);
            self.items(list, items)?;
            return Ok(list);
        }

        let members = map.iter().filter(|(key, _)| *key != ID_KEY);
        match map.get(TYPE_KEY) {
            Some(serde_json::Value::String(type_name)) => {
                let record = self.allocate(
                    Object::Record {
                        type_name: type_name.clone(),
                        fields: Vec::new(),
                    },
                    marker,
                );
                for (key, value) in members.filter(|(key, _)| *key != TYPE_KEY) {
                    let value = self.value(value)?;
                    self.graph
                        .push_field(record, Field::new(unescape_key(key), DeclaredType::Any, value))?;
                }
                Ok(record)
            }
            Some(other) => Err(Error::malformed(format!("{TYPE_KEY} must be a string, got {other}"))),
            None => {
                let entries = self.allocate(Object::Map(BTreeMap::new()), marker);
                for (key, value) in members {
                    let value = self.value(value)?;
                    self.graph.insert_entry(entries, unescape_key(key), value)?;
                }
                Ok(entries)
            }
        }
    }

    fn items(&mut self, list: ObjectId, items: &'j [serde_json::Value]) -> Result<()> {
        for item in items {
            let value = self.value(item)?;
            self.graph.push_item(list, value)?;
        }
        Ok(())
    }

    /// Store an object, registering its `$id` before any member is imported
    fn allocate(&mut self, object: Object, marker: Option<u64>) -> ObjectId {
        let id = ObjectId(self.graph.objects.len());
        self.graph.objects.push(object);
        if let Some(marker) = marker {
            self.imported.insert(marker, id);
        }
        id
    }
}

fn children(object: &Object) -> Box<dyn Iterator<Item = &Value> + '_> {
    match object {
        Object::List(items) => Box::new(items.iter()),
        Object::Map(entries) => Box::new(entries.values()),
        Object::Record { fields, .. } => Box::new(fields.iter().map(|f| &f.value)),
    }
}

fn escape_key(key: &str) -> String {
    if key.starts_with('$') {
        format!("${key}")
    } else {
        key.to_string()
    }
}

fn unescape_key(key: &str) -> &str {
    if key.starts_with("$$") {
        &key[1..]
    } else {
        key
    }
}

fn reference(id: ObjectId) -> serde_json::Value {
    let mut map = Map::new();
    map.insert(REF_KEY.to_string(), serde_json::Value::from(id.index()));
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DeclaredType, Field};
    use serde_json::json;

    #[test]
    fn test_import_json() {
        let (graph, root) = ObjectGraph::from_json(&json!({
            "name": "Ann",
            "tags": ["a", "b"],
            "age": 41,
            "ratio": 0.5,
            "spouse": null
        }))
        .unwrap();

        assert_eq!(graph.len(), 2);
        match graph.resolve(&root) {
            Some(Object::Map(entries)) => {
                assert_eq!(entries["name"], Value::from("Ann"));
                assert_eq!(entries["age"], Value::Integer(41));
                assert_eq!(entries["ratio"], Value::Float(0.5));
                assert!(entries["spouse"].is_null());
                assert_eq!(graph.runtime_type(&entries["tags"]), DeclaredType::List);
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_tree_exports_without_markers() {
        let input = json!({"a": [1, 2, {"b": true}], "c": "d"});
        let (graph, root) = ObjectGraph::from_json(&input).unwrap();
        assert_eq!(graph.to_json(&root), input);
    }

    #[test]
    fn test_shared_and_cyclic_objects_are_marked() {
        let mut graph = ObjectGraph::new();
        let list = graph.add_list(vec![]);
        let list_id = list.as_object().unwrap();
        graph.push_item(list_id, list.clone()).unwrap();
        let owner = graph.add_record(
            "Owner",
            vec![
                Field::new("first", DeclaredType::List, list.clone()),
                Field::new("second", DeclaredType::List, list.clone()),
            ],
        );

        let exported = graph.to_json(&owner);
        assert_eq!(
            exported,
            json!({
                "$type": "Owner",
                "first": {"$id": 0, "$items": [{"$ref": 0}]},
                "second": {"$ref": 0}
            })
        );
    }

    #[test]
    fn test_markers_import_as_shared_objects() {
        let exported = json!({
            "$type": "Owner",
            "first": {"$id": 0, "$items": [{"$ref": 0}]},
            "second": {"$ref": 0}
        });

        let (graph, root) = ObjectGraph::from_json(&exported).unwrap();
        assert_eq!(graph.len(), 2);
        let Some(Object::Record { type_name, fields }) = graph.resolve(&root) else {
            panic!("expected record");
        };
        assert_eq!(type_name, "Owner");
        assert_eq!(fields[0].value, fields[1].value);
        match graph.resolve(&fields[0].value) {
            Some(Object::List(items)) => assert_eq!(items[0], fields[0].value),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_before_definition() {
        let (graph, root) = ObjectGraph::from_json(&json!({
            "a": {"$ref": 3},
            "b": {"$id": 3, "city": "Oslo"}
        }))
        .unwrap();

        let Some(Object::Map(entries)) = graph.resolve(&root) else {
            panic!("expected map");
        };
        assert_eq!(entries["a"], entries["b"]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_dangling_reference_is_malformed() {
        let err = ObjectGraph::from_json(&json!([{"$ref": 9}])).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }), "{err}");

        let err = ObjectGraph::from_json(&json!([{"$id": 1}, {"$id": 1}])).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn test_dollar_keys_are_escaped() {
        let mut graph = ObjectGraph::new();
        let mut entries = BTreeMap::new();
        entries.insert("$ref".to_string(), Value::from(1));
        let only_ref = graph.add_map(entries);
        let mut entries = BTreeMap::new();
        entries.insert("$type".to_string(), Value::from("x"));
        entries.insert("$$cost".to_string(), Value::from(2));
        entries.insert("plain".to_string(), only_ref);
        let map = graph.add_map(entries);
        let record = graph.add_record("Tag", vec![Field::new("$id", DeclaredType::Any, map)]);

        let exported = graph.to_json(&record);
        assert_eq!(
            exported,
            json!({
                "$type": "Tag",
                "$$id": {
                    "$$type": "x",
                    "$$$cost": 2,
                    "plain": {"$$ref": 1}
                }
            })
        );

        let (imported, root) = ObjectGraph::from_json(&exported).unwrap();
        assert_eq!(imported.len(), 3);
        let Some(Object::Record { fields, .. }) = imported.resolve(&root) else {
            panic!("expected record");
        };
        assert_eq!(fields[0].name, "$id");
        let Some(Object::Map(entries)) = imported.resolve(&fields[0].value) else {
            panic!("expected map");
        };
        assert_eq!(entries["$type"], Value::from("x"));
        assert_eq!(entries["$$cost"], Value::Integer(2));
        match imported.resolve(&entries["plain"]) {
            Some(Object::Map(inner)) => assert_eq!(inner["$ref"], Value::Integer(1)),
            other => panic!("expected map, got {other:?}"),
        }
    }
}
