//! Value tree for structured anonymization
//!
//! [`DataValue`] is a closed sum type over the shapes a structured payload can
//! take. Containers are reference counted so a payload may share sub-trees or
//! even refer back to itself; every traversal tracks the containers that are
//! currently open to stay finite on such graphs.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Sentinel emitted in place of a container that is reached again while it is
/// still being visited.
pub const CIRCULAR_REFERENCE: &str = "[Circular Reference]";

/// Shared, mutable array node
pub type ArrayRef = Rc<RefCell<Vec<DataValue>>>;

/// Shared, mutable object node
pub type ObjectRef = Rc<RefCell<BTreeMap<String, DataValue>>>;

/// A JSON-like value that may contain dates and shared or cyclic containers
#[derive(Clone)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Array(ArrayRef),
    Object(ObjectRef),
}

impl DataValue {
    /// Build an array node
    pub fn array(items: impl IntoIterator<Item = DataValue>) -> Self {
        Self::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Build an object node
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, DataValue)>) -> Self {
        Self::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Build an empty object node
    pub fn empty_object() -> Self {
        Self::Object(Rc::new(RefCell::new(BTreeMap::new())))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Look up a field of an object node. Returns a handle sharing the child.
    pub fn get(&self, key: &str) -> Option<DataValue> {
        match self {
            Self::Object(map) => map.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Look up an element of an array node
    pub fn at(&self, index: usize) -> Option<DataValue> {
        match self {
            Self::Array(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Number of entries of a container, `None` for scalars
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(items.borrow().len()),
            Self::Object(map) => Some(map.borrow().len()),
            _ => None,
        }
    }

    /// Keys of an object node in iteration order
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Object(map) => map.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Insert a field into an object node. Returns `false` if `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: DataValue) -> bool {
        match self {
            Self::Object(map) => {
                map.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Append an element to an array node. Returns `false` if `self` is not an array.
    pub fn push(&self, value: DataValue) -> bool {
        match self {
            Self::Array(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Identity of the container behind this value, `None` for scalars
    pub fn container_id(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
            Self::Object(map) => Some(Rc::as_ptr(map) as *const () as usize),
            _ => None,
        }
    }

    /// Convert into a plain JSON value.
    ///
    /// Dates render as RFC 3339 strings and back edges of a cycle render as
    /// [`CIRCULAR_REFERENCE`].
    pub fn to_json(&self) -> Value {
        let mut open = OpenAncestors::default();
        self.to_json_inner(&mut open)
    }

    fn to_json_inner(&self, open: &mut OpenAncestors) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.to_rfc3339()),
            Self::Array(items) => {
                let id = Rc::as_ptr(items) as *const () as usize;
                if !open.enter(id) {
                    return Value::String(CIRCULAR_REFERENCE.to_string());
                }
                let out: Vec<Value> = items
                    .borrow()
                    .iter()
                    .map(|item| item.to_json_inner(open))
                    .collect();
                open.leave(id);
                Value::Array(out)
            }
            Self::Object(map) => {
                let id = Rc::as_ptr(map) as *const () as usize;
                if !open.enter(id) {
                    return Value::String(CIRCULAR_REFERENCE.to_string());
                }
                let out: Map<String, Value> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_inner(open)))
                    .collect();
                open.leave(id);
                Value::Object(out)
            }
        }
    }
}

/// Containers currently on the traversal path.
///
/// Only ancestors are tracked: a container left behind is removed again, so a
/// sub-tree reachable through two independent paths is visited both times.
#[derive(Debug, Default)]
pub(crate) struct OpenAncestors {
    ids: HashSet<usize>,
}

impl OpenAncestors {
    /// Mark a container as open. Returns `false` if it already is (a cycle).
    pub(crate) fn enter(&mut self, id: usize) -> bool {
        self.ids.insert(id)
    }

    pub(crate) fn leave(&mut self, id: usize) {
        self.ids.remove(&id);
    }

    pub(crate) fn depth(&self) -> usize {
        self.ids.len()
    }
}

// Debug goes through the cycle-safe JSON rendering; a derived impl would
// recurse forever on self-referencing payloads.
impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::array(items.into_iter().map(DataValue::from)),
            Value::Object(map) => Self::object(map.into_iter().map(|(k, v)| (k, v.into()))),
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}
