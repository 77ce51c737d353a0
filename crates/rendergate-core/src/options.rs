//! Comparison options shared by the equality engine, the update policy and memoization
//!
//! Every strategy is optional. An unset strategy falls back to the built-in
//! behaviour, so `Options::default()` gives the standard cursor-aware
//! comparison.
//!
//! # Example
//!
//! ```
//! use rendergate_core::{Options, Value};
//!
//! // Treat keys starting with an underscore as internal
//! let options = Options::default()
//!     .with_is_ignorable(|key, _| key.starts_with('_'))
//!     .with_deep_fallback(true);
//!
//! assert!(options.is_ignorable("_owner", &Value::Null));
//! assert!(!options.is_ignorable("title", &Value::Null));
//! assert!(options.deep_fallback());
//! ```

use crate::equality::{self, Kind};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Property key ignored by default
///
/// Statics are passed down to children but never trigger an update.
pub const STATICS_KEY: &str = "statics";

/// Classifies a value (cursor or immutable structure)
pub type ValuePredicate = Rc<dyn Fn(&Value) -> bool>;

/// Extracts the value a cursor points at
pub type UnwrapFn = Rc<dyn Fn(&Value) -> Value>;

/// Decides whether a property is left out of the comparison
pub type IgnorePredicate = Rc<dyn Fn(&str, &Value) -> bool>;

/// Compares two property values
pub type EqualityFn = Rc<dyn Fn(&Value, &Value) -> bool>;

/// Compares two component states; `None` means the component has no state
pub type StateEqualityFn = Rc<dyn Fn(Option<&Value>, Option<&Value>) -> bool>;

/// Comparison configuration
///
/// Cheap to clone: strategies are reference counted.
#[derive(Clone, Default)]
pub struct Options {
    is_cursor: Option<ValuePredicate>,
    is_immutable: Option<ValuePredicate>,
    unwrap_cursor: Option<UnwrapFn>,
    is_ignorable: Option<IgnorePredicate>,
    is_equal_props: Option<EqualityFn>,
    is_equal_state: Option<StateEqualityFn>,
    deep_fallback: bool,
}

impl Options {
    /// Create options with every strategy at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Override what counts as a cursor
    #[must_use]
    pub fn with_is_cursor(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_cursor = Some(Rc::new(f));
        self
    }

    /// Override what counts as an immutable structure
    #[must_use]
    pub fn with_is_immutable(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
        self.is_immutable = Some(Rc::new(f));
        self
    }

    /// Override how a cursor is unwrapped to the value it points at
    #[must_use]
    pub fn with_unwrap_cursor(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.unwrap_cursor = Some(Rc::new(f));
        self
    }

    /// Override which properties are left out of the comparison
    #[must_use]
    pub fn with_is_ignorable(mut self, f: impl Fn(&str, &Value) -> bool + 'static) -> Self {
        self.is_ignorable = Some(Rc::new(f));
        self
    }

    /// Override how two property values are compared
    #[must_use]
    pub fn with_is_equal_props(mut self, f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.is_equal_props = Some(Rc::new(f));
        self
    }

    /// Override how two states are compared
    #[must_use]
    pub fn with_is_equal_state(
        mut self,
        f: impl Fn(Option<&Value>, Option<&Value>) -> bool + 'static,
    ) -> Self {
        self.is_equal_state = Some(Rc::new(f));
        self
    }

    /// Compare cursors and structures against plain values by content
    ///
    /// When disabled (the default) such a comparison is always unequal.
    #[must_use]
    pub fn with_deep_fallback(mut self, enabled: bool) -> Self {
        self.deep_fallback = enabled;
        self
    }

    /// Check whether `value` is a cursor
    pub fn is_cursor(&self, value: &Value) -> bool {
        match &self.is_cursor {
            Some(f) => f(value),
            None => matches!(value, Value::Cursor(_)),
        }
    }

    /// Check whether `value` is an immutable structure
    pub fn is_immutable(&self, value: &Value) -> bool {
        match &self.is_immutable {
            Some(f) => f(value),
            None => matches!(value, Value::Structure(_)),
        }
    }

    /// Classify a value for comparison; cursor classification wins
    pub fn classify(&self, value: &Value) -> Kind {
        if self.is_cursor(value) {
            Kind::Cursor
        } else if self.is_immutable(value) {
            Kind::Immutable
        } else {
            Kind::Plain
        }
    }

    /// Get the value a cursor points at; non-cursors come back unchanged
    pub fn unwrap_cursor(&self, value: &Value) -> Value {
        match (&self.unwrap_cursor, value) {
            (Some(f), _) => f(value),
            (None, Value::Cursor(cursor)) => cursor.value(),
            (None, other) => other.clone(),
        }
    }

    /// Check whether a property is left out of the comparison
    pub fn is_ignorable(&self, key: &str, value: &Value) -> bool {
        match &self.is_ignorable {
            Some(f) => f(key, value),
            None => key == STATICS_KEY,
        }
    }

    /// Compare two property values
    pub fn is_equal_props(&self, a: &Value, b: &Value) -> bool {
        match &self.is_equal_props {
            Some(f) => f(a, b),
            None => equality::is_equal(a, b, self),
        }
    }

    /// Compare two states
    ///
    /// States are replaced wholesale rather than mutated, so the default is
    /// reference identity.
    pub fn is_equal_state(&self, a: Option<&Value>, b: Option<&Value>) -> bool {
        match &self.is_equal_state {
            Some(f) => f(a, b),
            None => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.is_identical(b),
                _ => false,
            },
        }
    }

    /// Whether mixed cursor/plain comparisons fall back to content equality
    pub fn deep_fallback(&self) -> bool {
        self.deep_fallback
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("is_cursor", &self.is_cursor.is_some())
            .field("is_immutable", &self.is_immutable.is_some())
            .field("unwrap_cursor", &self.unwrap_cursor.is_some())
            .field("is_ignorable", &self.is_ignorable.is_some())
            .field("is_equal_props", &self.is_equal_props.is_some())
            .field("is_equal_state", &self.is_equal_state.is_some())
            .field("deep_fallback", &self.deep_fallback)
            .finish()
    }
}
