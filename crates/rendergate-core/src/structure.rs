//! Persistent lists and maps with structural sharing
//!
//! A [`Structure`] is a reference-counted node. Writes never mutate a node in
//! place: they copy the nodes on the path from the root to the change and
//! reuse every other child by reference. Data that did not change therefore
//! keeps its identity, which is what lets the equality engine compare
//! structures by pointer.
//!
//! ```
//! use rendergate_core::{path, Structure, Value};
//!
//! let todos = Value::from(vec!["write", "test"]).into_persistent();
//! let state = Structure::map([("todos", todos), ("filter", Value::from("all"))]);
//!
//! let next = state.set_in(&path!["filter"], "done".into()).unwrap();
//! assert!(!next.ptr_eq(&state));
//!
//! // The untouched subtree is shared between versions
//! let before = state.get_in(&path!["todos"]).unwrap();
//! let after = next.get_in(&path!["todos"]).unwrap();
//! assert!(before.is_identical(after));
//! ```

use crate::error::{Error, Result};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// One step of a path into a nested value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Map key
    Key(String),
    /// List index
    Index(usize),
}

/// A sequence of segments from a root to a nested value
pub type Path = Vec<Segment>;

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Key(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Key(s)
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i)
    }
}

/// Build a [`Path`] from keys and indices
///
/// ```
/// use rendergate_core::{path, Segment};
///
/// let p = path!["todos", 0usize, "title"];
/// assert_eq!(p[1], Segment::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::Segment::from($segment)),*]
    };
}

/// Contents of a structure node
#[derive(Debug, Clone)]
pub enum Node {
    List(Vec<Value>),
    Map(ValueMap),
}

/// A persistent list or map
///
/// Cloning is cheap and yields a handle to the same node, so the clone stays
/// identical to the original.
#[derive(Clone)]
pub struct Structure {
    node: Rc<Node>,
}

impl Structure {
    fn from_node(node: Node) -> Self {
        Self {
            node: Rc::new(node),
        }
    }

    /// Create a persistent list
    ///
    /// Nested plain lists and maps are stored as structures.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::from_node(Node::List(
            items
                .into_iter()
                .map(|item| item.into().into_persistent())
                .collect(),
        ))
    }

    /// Create a persistent map
    ///
    /// Nested plain lists and maps are stored as structures.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::from_node(Node::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into().into_persistent()))
                .collect(),
        ))
    }

    /// Deeply convert a list or map into a persistent structure
    ///
    /// Nested plain containers become nested structures. Scalars are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value.into_persistent() {
            Value::Structure(s) => Ok(s),
            other => Err(Error::type_error("list or map", &other)),
        }
    }

    /// Get the node contents
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Get the items if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match &*self.node {
            Node::List(items) => Some(items),
            Node::Map(_) => None,
        }
    }

    /// Get the entries if this is a map
    pub fn as_map(&self) -> Option<&ValueMap> {
        match &*self.node {
            Node::Map(map) => Some(map),
            Node::List(_) => None,
        }
    }

    /// Number of items or entries
    pub fn len(&self) -> usize {
        match &*self.node {
            Node::List(items) => items.len(),
            Node::Map(map) => map.len(),
        }
    }

    /// Check if the structure has no items or entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether both handles point at the same node
    pub fn ptr_eq(&self, other: &Structure) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Get a direct child
    pub fn get(&self, segment: &Segment) -> Option<&Value> {
        match (&*self.node, segment) {
            (Node::List(items), Segment::Index(i)) => items.get(*i),
            (Node::Map(map), Segment::Key(k)) => map.get(k),
            _ => None,
        }
    }

    /// Follow a non-empty path through nested containers
    pub fn get_in(&self, path: &[Segment]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        self.get(first)?.get_in(rest)
    }

    /// Return a new structure with `segment` set to `value`
    ///
    /// Writing a value identical to the current one returns `self` unchanged.
    /// A list index equal to the length appends. Plain lists and maps are
    /// stored as structures, so reading them back keeps their identity.
    pub fn set(&self, segment: &Segment, value: Value) -> Result<Structure> {
        let value = value.into_persistent();
        if let Some(current) = self.get(segment) {
            if current.is_identical(&value) {
                return Ok(self.clone());
            }
        }

        let mut node = (*self.node).clone();
        match (&mut node, segment) {
            (Node::List(items), Segment::Index(i)) => {
                let len = items.len();
                match (*i).cmp(&len) {
                    std::cmp::Ordering::Less => items[*i] = value,
                    std::cmp::Ordering::Equal => items.push(value),
                    std::cmp::Ordering::Greater => {
                        return Err(Error::IndexOutOfBounds { index: *i, len });
                    }
                }
            }
            (Node::Map(map), Segment::Key(k)) => {
                map.insert(k.clone(), value);
            }
            (node, segment) => return Err(segment_mismatch(node, segment)),
        }
        Ok(Self::from_node(node))
    }

    /// Return a new structure with the value at `path` replaced
    ///
    /// Every intermediate step must already exist and be a structure. An empty
    /// path replaces the whole structure.
    pub fn set_in(&self, path: &[Segment], value: Value) -> Result<Structure> {
        let Some((first, rest)) = path.split_first() else {
            return Structure::from_value(value);
        };
        if rest.is_empty() {
            return self.set(first, value);
        }

        let child = match self.get(first) {
            Some(Value::Structure(s)) => s,
            Some(other) => return Err(Error::type_error("structure", other)),
            None => return Err(Error::KeyNotFound(first.to_string())),
        };
        let updated = child.set_in(rest, value)?;
        self.set(first, Value::Structure(updated))
    }

    /// Return a new structure with the value at `path` transformed by `f`
    ///
    /// `f` receives `Undefined` when the last segment does not exist yet.
    pub fn update_in(
        &self,
        path: &[Segment],
        f: impl FnOnce(&Value) -> Value,
    ) -> Result<Structure> {
        let current = if path.is_empty() {
            Value::Structure(self.clone())
        } else {
            self.get_in(path).cloned().unwrap_or_default()
        };
        self.set_in(path, f(&current))
    }

    /// Return a new structure without `segment`
    ///
    /// Removing something absent returns `self` unchanged. Map removal keeps
    /// the order of the remaining keys.
    pub fn remove(&self, segment: &Segment) -> Result<Structure> {
        if self.get(segment).is_none() {
            return match (&*self.node, segment) {
                (Node::List(_), Segment::Index(_)) | (Node::Map(_), Segment::Key(_)) => {
                    Ok(self.clone())
                }
                (node, segment) => Err(segment_mismatch(node, segment)),
            };
        }

        let mut node = (*self.node).clone();
        match (&mut node, segment) {
            (Node::List(items), Segment::Index(i)) => {
                items.remove(*i);
            }
            (Node::Map(map), Segment::Key(k)) => {
                map.shift_remove(k);
            }
            (node, segment) => return Err(segment_mismatch(node, segment)),
        }
        Ok(Self::from_node(node))
    }

    /// Deeply convert back into plain lists and maps
    pub fn to_value(&self) -> Value {
        match &*self.node {
            Node::List(items) => {
                Value::List(items.iter().cloned().map(Value::into_plain).collect())
            }
            Node::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone().into_plain()))
                    .collect(),
            ),
        }
    }
}

fn segment_mismatch(node: &Node, segment: &Segment) -> Error {
    let expected = match node {
        Node::List(_) => "index into list",
        Node::Map(_) => "key into map",
    };
    Error::TypeError {
        expected: expected.to_string(),
        got: format!("{:?}", segment),
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Structure").field(&*self.node).finish()
    }
}

impl Serialize for Structure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &*self.node {
            Node::List(items) => items.serialize(serializer),
            Node::Map(map) => map.serialize(serializer),
        }
    }
}
