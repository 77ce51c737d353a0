//! Update-decision policy: should a view re-render for new inputs?
//!
//! The policy compares the previous and next property sets key by key with
//! the equality engine, then compares component state. The first difference
//! decides; a [`Decision`] records which key changed and why.
//!
//! # Example
//!
//! ```
//! use rendergate_core::{path, Cursor, PropertySet, Structure, UpdatePolicy, Value};
//!
//! let root = Structure::from_value(Value::from(vec!["buy milk"])).unwrap();
//! let item = Cursor::at(root.clone(), path![0usize]);
//!
//! let mut prev = PropertySet::new();
//! prev.insert("item".into(), Value::Cursor(item.clone()));
//! let next = prev.clone();
//!
//! let policy = UpdatePolicy::default();
//! assert!(!policy.should_update(&prev, &next, None, None));
//!
//! let mut changed = PropertySet::new();
//! changed.insert("item".into(), Value::Cursor(item.set("buy eggs".into()).unwrap()));
//! assert!(policy.should_update(&prev, &changed, None, None));
//! ```

use crate::equality::Kind;
use crate::options::Options;
use crate::trace::Tracer;
use crate::value::{PropertySet, Value};
use std::fmt;

/// Why an update was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Two cursors or structures stopped pointing at the same data
    CursorChanged,
    /// Two plain values differ structurally
    ValueChanged,
    /// A cursor or structure was compared with a value of another kind
    NotImmutableFallback,
    /// A property exists on only one side
    KeysChanged,
    /// Component state differs
    StateChanged,
}

impl Reason {
    /// Stable label used in trace output
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::CursorChanged => "cursor-changed",
            Reason::ValueChanged => "value-changed",
            Reason::NotImmutableFallback => "not-immutable-fallback",
            Reason::KeysChanged => "keys-changed",
            Reason::StateChanged => "state-changed",
        }
    }

    fn for_values(prev: &Value, next: &Value, options: &Options) -> Self {
        match (options.classify(prev), options.classify(next)) {
            (Kind::Cursor, Kind::Cursor) | (Kind::Immutable, Kind::Immutable) => {
                Reason::CursorChanged
            }
            (Kind::Plain, Kind::Plain) => Reason::ValueChanged,
            _ => Reason::NotImmutableFallback,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The property keys behind an update and the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    /// Keys that differed; empty for state changes
    pub keys: Vec<String>,
    /// What kind of difference was found
    pub reason: Reason,
}

/// Why no update was needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The very same props and state were passed in again
    SameInput,
    /// Everything compared equal
    Equal,
}

impl SkipReason {
    /// Stable label used in trace output
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::SameInput => "same-input",
            SkipReason::Equal => "equal",
        }
    }
}

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Update(DecisionRecord),
}

impl Decision {
    /// The boolean verdict
    pub fn should_update(&self) -> bool {
        matches!(self, Decision::Update(_))
    }

    /// What changed, for an update
    pub fn record(&self) -> Option<&DecisionRecord> {
        match self {
            Decision::Update(record) => Some(record),
            Decision::Skip(_) => None,
        }
    }

    /// Label of the skip or update reason
    pub fn reason_label(&self) -> &'static str {
        match self {
            Decision::Skip(reason) => reason.as_str(),
            Decision::Update(record) => record.reason.as_str(),
        }
    }

    fn update(keys: Vec<String>, reason: Reason) -> Self {
        Decision::Update(DecisionRecord { keys, reason })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Skip(reason) => write!(f, "false ({})", reason.as_str()),
            Decision::Update(record) if record.keys.is_empty() => {
                write!(f, "true ({})", record.reason)
            }
            Decision::Update(record) => {
                write!(f, "true ({}: {})", record.reason, record.keys.join(", "))
            }
        }
    }
}

/// Decides whether a view must re-render
///
/// Holds its [`Options`]; build it once and share it by reference.
#[derive(Debug, Clone, Default)]
pub struct UpdatePolicy {
    options: Options,
}

impl UpdatePolicy {
    /// Create a policy with the given options
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// The options this policy compares with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Check whether a view must re-render
    ///
    /// `None` state means the component keeps no local state.
    pub fn should_update(
        &self,
        prev_props: &PropertySet,
        next_props: &PropertySet,
        prev_state: Option<&Value>,
        next_state: Option<&Value>,
    ) -> bool {
        self.decide(prev_props, next_props, prev_state, next_state)
            .should_update()
    }

    /// Like [`should_update`](Self::should_update), reporting the decision to `tracer`
    pub fn should_update_traced(
        &self,
        tracer: &Tracer,
        component: &str,
        prev_props: &PropertySet,
        next_props: &PropertySet,
        prev_state: Option<&Value>,
        next_state: Option<&Value>,
    ) -> bool {
        let decision = self.decide(prev_props, next_props, prev_state, next_state);
        tracer.decision(component, &decision);
        decision.should_update()
    }

    /// Decide whether a view must re-render and record why
    pub fn decide(
        &self,
        prev_props: &PropertySet,
        next_props: &PropertySet,
        prev_state: Option<&Value>,
        next_state: Option<&Value>,
    ) -> Decision {
        if std::ptr::eq(prev_props, next_props) && same_state_ref(prev_state, next_state) {
            return Decision::Skip(SkipReason::SameInput);
        }

        let options = &self.options;

        let mut one_sided: Vec<String> = self
            .visible(prev_props)
            .filter(|(key, _)| self.lookup(next_props, key).is_none())
            .map(|(key, _)| key.clone())
            .collect();
        one_sided.extend(
            self.visible(next_props)
                .filter(|(key, _)| self.lookup(prev_props, key).is_none())
                .map(|(key, _)| key.clone()),
        );
        if !one_sided.is_empty() {
            return Decision::update(one_sided, Reason::KeysChanged);
        }

        for (key, prev) in self.visible(prev_props) {
            let Some(next) = self.lookup(next_props, key) else {
                continue;
            };
            if !options.is_equal_props(prev, next) {
                return Decision::update(vec![key.clone()], Reason::for_values(prev, next, options));
            }
        }

        if !options.is_equal_state(prev_state, next_state) {
            return Decision::update(Vec::new(), Reason::StateChanged);
        }

        Decision::Skip(SkipReason::Equal)
    }

    /// Properties that take part in the comparison
    fn visible<'a>(
        &'a self,
        props: &'a PropertySet,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        props
            .iter()
            .filter(move |(key, value)| !self.options.is_ignorable(key, value))
    }

    fn lookup<'a>(&self, props: &'a PropertySet, key: &str) -> Option<&'a Value> {
        props
            .get(key)
            .filter(|value| !self.options.is_ignorable(key, value))
    }
}

fn same_state_ref(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceEvent;
    use crate::{path, Callback, Cursor, Structure};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn props(entries: Vec<(&str, Value)>) -> PropertySet {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn todo_root() -> Structure {
        Structure::from_value(Value::from(vec!["a", "b"])).unwrap()
    }

    #[test]
    fn test_same_input_never_updates() {
        let policy = UpdatePolicy::default();
        let p = props(vec![("x", Value::Int(1)), ("list", vec![1i64].into())]);
        let s: Value = vec![1i64].into();

        assert_eq!(
            policy.decide(&p, &p, Some(&s), Some(&s)),
            Decision::Skip(SkipReason::SameInput)
        );
        assert!(!policy.should_update(&p, &p, None, None));
    }

    #[test]
    fn test_equal_copies_do_not_update() {
        let policy = UpdatePolicy::default();
        let prev = props(vec![("a", Value::Int(1)), ("b", vec![1i64, 2].into())]);
        let next = prev.clone();
        assert_eq!(
            policy.decide(&prev, &next, None, None),
            Decision::Skip(SkipReason::Equal)
        );
    }

    #[test]
    fn test_changed_plain_value() {
        let policy = UpdatePolicy::default();
        let prev = props(vec![("a", Value::Int(1)), ("b", Value::Int(2))]);
        let next = props(vec![("a", Value::Int(1)), ("b", Value::Int(3))]);

        let decision = policy.decide(&prev, &next, None, None);
        assert_eq!(
            decision.record(),
            Some(&DecisionRecord {
                keys: vec!["b".into()],
                reason: Reason::ValueChanged,
            })
        );
    }

    #[test]
    fn test_added_and_removed_keys() {
        let policy = UpdatePolicy::default();
        let prev = props(vec![("a", Value::Int(1)), ("gone", Value::Int(2))]);
        let next = props(vec![("a", Value::Int(1)), ("new", Value::Undefined)]);

        let decision = policy.decide(&prev, &next, None, None);
        let record = decision.record().unwrap();
        assert_eq!(record.reason, Reason::KeysChanged);
        assert_eq!(record.keys, vec!["gone".to_string(), "new".to_string()]);
    }

    #[test]
    fn test_ignorable_keys() {
        let policy = UpdatePolicy::default();
        let prev = props(vec![("a", Value::Int(1)), ("statics", Value::Int(1))]);

        let changed_static = props(vec![("a", Value::Int(1)), ("statics", Value::Int(2))]);
        assert!(!policy.should_update(&prev, &changed_static, None, None));

        let dropped_static = props(vec![("a", Value::Int(1))]);
        assert!(!policy.should_update(&prev, &dropped_static, None, None));

        let changed_other = props(vec![("a", Value::Int(2)), ("statics", Value::Int(1))]);
        assert!(policy.should_update(&prev, &changed_other, None, None));
    }

    #[test]
    fn test_custom_ignorable_uses_value() {
        // Ignore callback props: handlers are recreated every render
        let policy = UpdatePolicy::new(
            Options::default().with_is_ignorable(|_, value| value.as_function().is_some()),
        );
        let prev = props(vec![("on_click", Callback::new(|_| Value::Null).into())]);
        let next = props(vec![("on_click", Callback::new(|_| Value::Null).into())]);
        assert!(!policy.should_update(&prev, &next, None, None));

        let replaced = props(vec![("on_click", Value::Null)]);
        assert!(policy.should_update(&prev, &replaced, None, None));
    }

    #[test]
    fn test_cursor_scenarios() {
        let policy = UpdatePolicy::default();
        let root = todo_root();
        let cursor1 = Cursor::at(root.clone(), path![0usize]);

        let prev = props(vec![("x", Value::Cursor(cursor1.clone()))]);
        let same = props(vec![("x", Value::Cursor(cursor1.clone()))]);
        assert!(!policy.should_update(&prev, &same, None, None));

        // Structurally shared: only the second item changed
        let shared_root = root.set(&1usize.into(), "c".into()).unwrap();
        let shared = props(vec![("x", Value::Cursor(Cursor::at(shared_root, path![0usize])))]);
        assert!(!policy.should_update(&prev, &shared, None, None));

        let cursor2 = cursor1.set("z".into()).unwrap();
        let changed = props(vec![("x", Value::Cursor(cursor2))]);
        let decision = policy.decide(&prev, &changed, None, None);
        assert_eq!(decision.record().unwrap().reason, Reason::CursorChanged);
    }

    #[test]
    fn test_same_cursor_over_list_child_does_not_update() {
        let policy = UpdatePolicy::default();
        let root = Structure::map([("items", Value::from(vec![1i64, 2]))]);
        let cursor = Value::Cursor(Cursor::at(root, path!["items"]));
        let prev = props(vec![("x", cursor.clone())]);
        let next = props(vec![("x", cursor)]);
        assert_eq!(
            policy.decide(&prev, &next, None, None),
            Decision::Skip(SkipReason::Equal)
        );
    }

    #[test]
    fn test_cursor_to_subtree_rebuilt_with_equal_content() {
        let policy = UpdatePolicy::default();
        let prev = props(vec![("list", Value::Cursor(Cursor::new(todo_root())))]);
        let next = props(vec![("list", Value::Cursor(Cursor::new(todo_root())))]);
        assert!(policy.should_update(&prev, &next, None, None));
    }

    #[test]
    fn test_kind_change_reason_and_fallback() {
        let plain: Value = vec!["a", "b"].into();
        let prev = props(vec![("list", Value::Cursor(Cursor::new(todo_root())))]);
        let next = props(vec![("list", plain)]);

        let strict = UpdatePolicy::default();
        let decision = strict.decide(&prev, &next, None, None);
        assert_eq!(decision.record().unwrap().reason, Reason::NotImmutableFallback);

        let lenient = UpdatePolicy::new(Options::default().with_deep_fallback(true));
        assert!(!lenient.should_update(&prev, &next, None, None));
    }

    #[test]
    fn test_state_identity() {
        let policy = UpdatePolicy::default();
        let p = props(vec![("a", Value::Int(1))]);
        let q = p.clone();
        let state: Value = Structure::map([("open", true)]).into();
        let same_state = state.clone();
        let rebuilt: Value = Structure::map([("open", true)]).into();

        assert!(!policy.should_update(&p, &q, Some(&state), Some(&same_state)));
        let decision = policy.decide(&p, &q, Some(&state), Some(&rebuilt));
        assert_eq!(
            decision.record(),
            Some(&DecisionRecord {
                keys: Vec::new(),
                reason: Reason::StateChanged,
            })
        );
        assert!(policy.should_update(&p, &q, None, Some(&state)));
    }

    #[test]
    fn test_custom_equality_overrides() {
        // Compare everything loosely, including state
        let options = Options::default()
            .with_is_equal_props(|a, b| a.type_name() == b.type_name())
            .with_is_equal_state(|_, _| true);
        let policy = UpdatePolicy::new(options);

        let prev = props(vec![("n", Value::Int(1))]);
        let next = props(vec![("n", Value::Int(99))]);
        let state = Value::Int(1);
        let other_state = Value::Int(2);
        assert!(!policy.should_update(&prev, &next, Some(&state), Some(&other_state)));
    }

    #[test]
    fn test_traced_reports_without_changing_verdict() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink_lines = lines.clone();
        let mut tracer = Tracer::new();
        tracer
            .enable_with_sink("Todo", move |event: &TraceEvent<'_>| {
                sink_lines.borrow_mut().push(event.to_string())
            })
            .unwrap();

        let policy = UpdatePolicy::default();
        let prev = props(vec![("title", "a".into())]);
        let next = props(vec![("title", "b".into())]);

        assert!(policy.should_update_traced(&tracer, "TodoItem", &prev, &next, None, None));
        tracer.render("TodoItem");
        assert!(!policy.should_update_traced(&tracer, "TodoItem", &prev, &prev, None, None));
        assert!(policy.should_update_traced(&tracer, "Header", &prev, &next, None, None));

        assert_eq!(
            *lines.borrow(),
            vec![
                "<TodoItem>: should_update => true (value-changed: title)".to_string(),
                "<TodoItem>: render".to_string(),
                "<TodoItem>: should_update => false (same-input)".to_string(),
            ]
        );
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Skip(SkipReason::Equal).to_string(), "false (equal)");
        assert_eq!(
            Decision::update(Vec::new(), Reason::StateChanged).to_string(),
            "true (state-changed)"
        );
        assert_eq!(
            Decision::update(vec!["a".into(), "b".into()], Reason::KeysChanged).to_string(),
            "true (keys-changed: a, b)"
        );
    }
}
