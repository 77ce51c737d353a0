//! Cursor-aware equality engine
//!
//! Values are classified before they are compared:
//!
//! | Left \ Right  | Cursor                        | Immutable      | Plain          |
//! |---------------|-------------------------------|----------------|----------------|
//! | **Cursor**    | identity of the pointed data  | unequal*       | unequal*       |
//! | **Immutable** | unequal*                      | reference      | unequal*       |
//! | **Plain**     | unequal*                      | unequal*       | deep structure |
//!
//! `*` With [`Options::with_deep_fallback`] enabled these cells unwrap any
//! cursor and compare contents instead.
//!
//! Deep comparison recurses through [`is_equal`], so a cursor nested inside a
//! plain list is still compared as a cursor. Recursion depth follows the
//! nesting depth of the data; owned values cannot form cycles.

use crate::options::Options;
use crate::value::{Value, ValueMap};
use crate::structure::Node;
use std::borrow::Cow;

/// How a value takes part in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Points into a larger persistent structure
    Cursor,
    /// Persistent container; unchanged data keeps its reference
    Immutable,
    /// Everything else
    Plain,
}

/// Compare two values under the given options
///
/// # Example
///
/// ```
/// use rendergate_core::{is_equal, Options, Value, ValueMap};
///
/// let mut a = ValueMap::new();
/// a.insert("a".into(), Value::Int(1));
/// a.insert("b".into(), vec![1i64, 2].into());
/// let b = a.clone();
///
/// assert!(is_equal(&Value::Map(a), &Value::Map(b), &Options::default()));
/// assert!(is_equal(&Value::Float(f64::NAN), &Value::Float(f64::NAN), &Options::default()));
/// ```
pub fn is_equal(a: &Value, b: &Value, options: &Options) -> bool {
    match (options.classify(a), options.classify(b)) {
        (Kind::Cursor, Kind::Cursor) => {
            a.is_identical(b)
                || options
                    .unwrap_cursor(a)
                    .is_identical(&options.unwrap_cursor(b))
        }
        (Kind::Immutable, Kind::Immutable) => a.is_identical(b),
        (Kind::Plain, Kind::Plain) => deep_equal(a, b, options),
        _ if options.deep_fallback() => {
            let a = unwrapped(a, options);
            let b = unwrapped(b, options);
            deep_equal(&a, &b, options)
        }
        _ => false,
    }
}

fn unwrapped<'a>(value: &'a Value, options: &Options) -> Cow<'a, Value> {
    if options.is_cursor(value) {
        Cow::Owned(options.unwrap_cursor(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// A value seen through its contents: structures look like the list or map they hold
enum Contents<'a> {
    List(&'a [Value]),
    Map(&'a ValueMap),
    Scalar(&'a Value),
}

fn contents(value: &Value) -> Contents<'_> {
    match value {
        Value::List(items) => Contents::List(items),
        Value::Map(map) => Contents::Map(map),
        Value::Structure(s) => match s.node() {
            Node::List(items) => Contents::List(items),
            Node::Map(map) => Contents::Map(map),
        },
        other => Contents::Scalar(other),
    }
}

fn deep_equal(a: &Value, b: &Value, options: &Options) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (contents(a), contents(b)) {
        (Contents::List(x), Contents::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| is_equal(x, y, options))
        }
        (Contents::Map(x), Contents::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| is_equal(v, w, options)))
        }
        (Contents::Scalar(x), Contents::Scalar(y)) => primitive_eq(x, y),
        _ => false,
    }
}

/// Scalar equality
///
/// Numbers compare by value across `Int` and `Float`, `NaN` equals `NaN`, and
/// `0.0` equals `-0.0`. `Null` and `Undefined` are distinct. Functions and
/// cursors compare by reference.
pub(crate) fn primitive_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => float_eq(*x, *y),
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => {
            int_float_eq(*x, *y)
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.ptr_eq(y),
        (Value::Cursor(x), Value::Cursor(y)) => x.is_identical(y),
        _ => false,
    }
}

fn float_eq(x: f64, y: f64) -> bool {
    x == y || (x.is_nan() && y.is_nan())
}

/// Exact: the float must be a whole number inside the `i64` range
fn int_float_eq(x: i64, y: f64) -> bool {
    y.fract() == 0.0 && y >= i64::MIN as f64 && y < i64::MAX as f64 && y as i64 == x
}
