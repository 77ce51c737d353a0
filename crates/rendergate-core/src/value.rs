//! Dynamic value types for render inputs

use crate::cursor::Cursor;
use crate::equality;
use crate::structure::{Segment, Structure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A dynamic value passed to a view as a property or state field
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Undefined,
    /// Explicit null, never coerced to `Undefined`
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Plain list, compared element-wise
    List(Vec<Value>),
    /// Plain map of string keys to values, compared key by key
    Map(ValueMap),
    /// Shared function, compared by reference
    #[serde(skip)]
    Function(Callback),
    /// Persistent structure, compared by reference
    #[serde(skip_deserializing)]
    Structure(Structure),
    /// Cursor into a persistent structure, compared by the identity of what it points to
    #[serde(skip_deserializing)]
    Cursor(Cursor),
}

/// A map of string keys to dynamic values
///
/// Uses IndexMap to preserve insertion order (keys are reported in the order they were set)
pub type ValueMap = IndexMap<String, Value>;

/// One render's full input: property name to value
pub type PropertySet = ValueMap;

/// A reference-counted function value
///
/// Two callbacks are equal only when they share the same allocation; cloning a
/// callback keeps it equal to the original.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[Value]) -> Value>);

impl Callback {
    /// Wrap a function
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Check whether both callbacks share the same allocation
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        // Compare data pointers only; vtable pointers may differ between codegen units
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

impl Value {
    /// Check if this value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a plain list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get this value as a plain map
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get this value as a function
    pub fn as_function(&self) -> Option<&Callback> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Try to get this value as a persistent structure
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a cursor
    pub fn as_cursor(&self) -> Option<&Cursor> {
        match self {
            Value::Cursor(c) => Some(c),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Structure(_) => "structure",
            Value::Cursor(_) => "cursor",
        }
    }

    /// Look up a direct child of a list, map or structure
    pub fn get(&self, segment: &Segment) -> Option<&Value> {
        match (self, segment) {
            (Value::Structure(s), _) => s.get(segment),
            (Value::List(items), Segment::Index(i)) => items.get(*i),
            (Value::Map(map), Segment::Key(k)) => map.get(k),
            _ => None,
        }
    }

    /// Follow a path through nested containers
    pub fn get_in(&self, path: &[Segment]) -> Option<&Value> {
        path.iter().try_fold(self, |value, segment| value.get(segment))
    }

    /// Check whether two values are the same reference
    ///
    /// Scalars have no identity of their own and are compared by primitive
    /// equality. Structures and functions compare by pointer, cursors by root
    /// pointer and path. Two distinct plain containers are never identical.
    pub fn is_identical(&self, other: &Value) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self, other) {
            (Value::Structure(a), Value::Structure(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Cursor(a), Value::Cursor(b)) => a.is_identical(b),
            (Value::List(_), _) | (Value::Map(_), _) => false,
            (a, b) => equality::primitive_eq(a, b),
        }
    }

    /// Convert nested plain lists and maps into persistent structures
    pub fn into_persistent(self) -> Value {
        match self {
            Value::List(items) => Value::Structure(Structure::list(items)),
            Value::Map(map) => Value::Structure(Structure::map(map)),
            other => other,
        }
    }

    /// Convert structures and cursors back into plain values
    pub fn into_plain(self) -> Value {
        match self {
            Value::Structure(s) => s.to_value(),
            Value::Cursor(c) => c.value().into_plain(),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_plain).collect()),
            Value::Map(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, v.into_plain())).collect())
            }
            other => other,
        }
    }
}

/// Deep equality with the default comparison options
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equality::is_equal(self, other, &crate::Options::default())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(list) => write_list(f, list),
            Value::Map(map) => write_map(f, map),
            Value::Function(_) => write!(f, "<function>"),
            Value::Structure(s) => match (s.as_list(), s.as_map()) {
                (Some(list), _) => write_list(f, list),
                (_, Some(map)) => write_map(f, map),
                _ => Ok(()),
            },
            Value::Cursor(c) => write!(f, "cursor({})", c.value()),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in list.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    write!(f, "]")
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &ValueMap) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", k, v)?;
    }
    write!(f, "}}")
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl From<Structure> for Value {
    fn from(s: Structure) -> Self {
        Value::Structure(s)
    }
}

impl From<Cursor> for Value {
    fn from(c: Cursor) -> Self {
        Value::Cursor(c)
    }
}

impl From<Callback> for Value {
    fn from(f: Callback) -> Self {
        Value::Function(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(vec: Vec<T>) -> Self {
        Value::List(vec.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
