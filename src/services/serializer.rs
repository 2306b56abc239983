//! Failure-tolerant JSON serialization for the history cache.
//!
//! [`serialize`] never fails: a value serde cannot encode becomes `"{}"`.
//! [`SharedValue`] models UI state whose nodes may be shared or cyclic;
//! every node reached a second time is written as [`CIRCULAR_MARKER`].
//! A list of such values goes through [`serialize_shared`], which tracks
//! nodes across the whole list rather than per element.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// Written in place of a node that was already serialized once.
pub const CIRCULAR_MARKER: &str = "[Circular Reference]";

/// Written when a value cannot be serialized at all.
pub const EMPTY_OBJECT: &str = "{}";

/// Serializes `value` to compact JSON, falling back to `"{}"` on any error.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!("history serialization failed, writing empty object: {}", e);
            EMPTY_OBJECT.to_string()
        }
    }
}

/// Serializes a list of shared nodes as one JSON array.
///
/// Nodes are tracked across the whole list, so a node reachable from two
/// elements is written in full once and as [`CIRCULAR_MARKER`] afterwards.
pub fn serialize_shared(values: &[SharedValue]) -> String {
    serialize(&SharedList(values))
}

/// UTF-8 encoded length of `s`, used for budget comparisons.
pub fn estimate_byte_size(s: &str) -> usize {
    // Rust strings are UTF-8 already, so this is exact.
    s.len()
}

/// A JSON-like value whose arrays and objects are reference-counted nodes.
///
/// Cloning an `Array` or `Object` clones the handle, not the contents, so
/// the same node can appear in several places, including inside itself.
#[derive(Clone)]
pub enum SharedValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Rc<RefCell<Vec<SharedValue>>>),
    Object(Rc<RefCell<Vec<(String, SharedValue)>>>),
}

impl SharedValue {
    /// New empty object node.
    pub fn object() -> Self {
        SharedValue::Object(Rc::new(RefCell::new(Vec::new())))
    }

    /// New empty array node.
    pub fn array() -> Self {
        SharedValue::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// Sets `key` on an object node, keeping insertion order. No-op on other variants.
    pub fn insert(&self, key: &str, value: SharedValue) {
        if let SharedValue::Object(fields) = self {
            let mut fields = fields.borrow_mut();
            match fields.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = value,
                None => fields.push((key.to_string(), value)),
            }
        }
    }

    /// Appends to an array node. No-op on other variants.
    pub fn push(&self, value: SharedValue) {
        if let SharedValue::Array(items) = self {
            items.borrow_mut().push(value);
        }
    }
}

impl From<Value> for SharedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SharedValue::Null,
            Value::Bool(b) => SharedValue::Bool(b),
            Value::Number(n) => SharedValue::Number(n),
            Value::String(s) => SharedValue::String(s),
            Value::Array(items) => SharedValue::Array(Rc::new(RefCell::new(
                items.into_iter().map(SharedValue::from).collect(),
            ))),
            Value::Object(map) => SharedValue::Object(Rc::new(RefCell::new(
                map.into_iter().map(|(k, v)| (k, SharedValue::from(v))).collect(),
            ))),
        }
    }
}

impl Serialize for SharedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let seen = RefCell::new(HashSet::new());
        Tracked { node: self, seen: &seen }.serialize(serializer)
    }
}

struct SharedList<'a>(&'a [SharedValue]);

impl Serialize for SharedList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let seen = RefCell::new(HashSet::new());
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for node in self.0 {
            seq.serialize_element(&Tracked { node, seen: &seen })?;
        }
        seq.end()
    }
}

/// A node paired with the set of node addresses already written.
struct Tracked<'a> {
    node: &'a SharedValue,
    seen: &'a RefCell<HashSet<usize>>,
}

impl Tracked<'_> {
    fn first_visit<T>(&self, node: &Rc<T>) -> bool {
        self.seen.borrow_mut().insert(Rc::as_ptr(node) as *const () as usize)
    }

    fn child<'b>(&'b self, node: &'b SharedValue) -> Tracked<'b> {
        Tracked {
            node,
            seen: self.seen,
        }
    }
}

impl Serialize for Tracked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node {
            SharedValue::Null => serializer.serialize_unit(),
            SharedValue::Bool(b) => serializer.serialize_bool(*b),
            SharedValue::Number(n) => n.serialize(serializer),
            SharedValue::String(s) => serializer.serialize_str(s),
            SharedValue::Array(items) => {
                if !self.first_visit(items) {
                    return serializer.serialize_str(CIRCULAR_MARKER);
                }
                let items = items.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            SharedValue::Object(fields) => {
                if !self.first_visit(fields) {
                    return serializer.serialize_str(CIRCULAR_MARKER);
                }
                let fields = fields.borrow();
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields.iter() {
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            }
        }
    }
}
