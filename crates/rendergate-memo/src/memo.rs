//! Single-slot memoization
//!
//! A [`Memo`] owns a computation and remembers the result of its last
//! successful call. The next call reuses that result when the update policy
//! finds the new arguments unchanged, comparing them as a property set keyed
//! by position (`"0"`, `"1"`, ...). Only one result is kept: this targets the
//! "same inputs as the last render" pattern, not arbitrary reuse.
//!
//! # Failure
//!
//! If the computation returns an error, the previous entry stays in place and
//! the error is returned as is. A panicking computation leaves the entry in
//! place too.

use crate::stats::MemoStats;
use rendergate_core::{PropertySet, UpdatePolicy, Value};
use std::convert::Infallible;
use std::fmt;

type Compute<R, E> = Box<dyn FnMut(&[Value]) -> Result<R, E>>;

/// The last arguments and the result computed for them
struct Slot<R> {
    args: PropertySet,
    result: R,
}

/// A computation with a one-entry cache
pub struct Memo<R, E = Infallible> {
    compute: Compute<R, E>,
    policy: UpdatePolicy,
    slot: Option<Slot<R>>,
    stats: MemoStats,
}

impl<R: 'static> Memo<R, Infallible> {
    /// Memoize a computation that cannot fail
    ///
    /// # Example
    ///
    /// ```
    /// use rendergate_core::Value;
    /// use rendergate_memo::Memo;
    ///
    /// let mut total = Memo::new(|args: &[Value]| {
    ///     args.iter().filter_map(Value::as_int).sum::<i64>()
    /// });
    ///
    /// assert_eq!(*total.get(&[Value::Int(1), Value::Int(2)]), 3);
    /// assert_eq!(*total.get(&[Value::Int(1), Value::Int(2)]), 3);
    /// assert_eq!(total.stats().hits, 1);
    /// ```
    pub fn new(mut compute: impl FnMut(&[Value]) -> R + 'static) -> Self {
        Self::try_new(move |args| Ok(compute(args)))
    }

    /// Call the computation, or return the cached result
    pub fn get(&mut self, args: &[Value]) -> &R {
        match self.call(args) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }
}

impl<R, E> Memo<R, E> {
    /// Memoize a computation that can fail
    pub fn try_new(compute: impl FnMut(&[Value]) -> Result<R, E> + 'static) -> Self {
        Self {
            compute: Box::new(compute),
            policy: UpdatePolicy::default(),
            slot: None,
            stats: MemoStats::default(),
        }
    }

    /// Compare arguments with `policy` instead of the default one
    #[must_use]
    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy used to compare arguments
    pub fn policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    /// Call the computation, or return the cached result
    ///
    /// The computation runs when nothing is cached yet or when the policy
    /// reports that `args` differ from the cached arguments.
    pub fn call(&mut self, args: &[Value]) -> Result<&R, E> {
        let key = positional(args);

        let hit = self
            .slot
            .as_ref()
            .is_some_and(|slot| !self.policy.should_update(&slot.args, &key, None, None));
        // The cached entry stays in place while the computation runs
        let cached = if hit { self.slot.take() } else { None };

        let slot = match cached {
            Some(slot) => {
                self.stats.hits += 1;
                tracing::trace!(target: "rendergate::memo", args = args.len(), "cache hit");
                slot
            }
            None => match (self.compute)(args) {
                Ok(result) => {
                    self.stats.misses += 1;
                    tracing::trace!(
                        target: "rendergate::memo",
                        args = args.len(),
                        replaced = self.slot.is_some(),
                        "cache miss"
                    );
                    Slot { args: key, result }
                }
                Err(err) => {
                    self.stats.failures += 1;
                    tracing::trace!(
                        target: "rendergate::memo",
                        "computation failed, keeping cache"
                    );
                    return Err(err);
                }
            },
        };

        Ok(&self.slot.insert(slot).result)
    }

    /// Check whether a result is cached
    pub fn is_cached(&self) -> bool {
        self.slot.is_some()
    }

    /// The cached result, if any
    pub fn cached(&self) -> Option<&R> {
        self.slot.as_ref().map(|slot| &slot.result)
    }

    /// Drop the cached entry so the next call recomputes
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Hit, miss and failure counters
    pub fn stats(&self) -> MemoStats {
        self.stats
    }
}

impl<R: fmt::Debug, E> fmt::Debug for Memo<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("cached", &self.cached())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Arguments as a property set keyed by position
fn positional(args: &[Value]) -> PropertySet {
    args.iter()
        .enumerate()
        .map(|(i, value)| (i.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendergate_core::{path, Cursor, Options, Structure};
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    fn counted<R: 'static>(
        f: impl Fn(&[Value]) -> R + 'static,
    ) -> (Memo<R>, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let memo = Memo::new(move |args: &[Value]| {
            counter.set(counter.get() + 1);
            f(args)
        });
        (memo, runs)
    }

    #[test]
    fn test_equal_arguments_compute_once() {
        let (mut memo, runs) = counted(|args| args.len());

        let args = vec![Value::Int(1), Value::from(vec![1i64, 2])];
        assert_eq!(*memo.get(&args), 2);
        assert_eq!(*memo.get(&args.clone()), 2);
        assert_eq!(runs.get(), 1);
        assert_eq!(memo.stats().hits, 1);
        assert_eq!(memo.stats().misses, 1);
    }

    #[test]
    fn test_changed_arguments_recompute_and_replace() {
        let (mut memo, runs) = counted(|args| args[0].as_int().unwrap_or(0) * 10);

        assert_eq!(*memo.get(&[Value::Int(1)]), 10);
        assert_eq!(*memo.get(&[Value::Int(2)]), 20);
        assert_eq!(runs.get(), 2);
        assert_eq!(memo.cached(), Some(&20));

        // Only the newest entry is kept
        assert_eq!(*memo.get(&[Value::Int(1)]), 10);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_argument_count_change_recomputes() {
        let (mut memo, runs) = counted(|args| args.len());
        memo.get(&[Value::Int(1)]);
        memo.get(&[Value::Int(1), Value::Undefined]);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_no_arguments() {
        let (mut memo, runs) = counted(|_| "static");
        assert_eq!(*memo.get(&[]), "static");
        assert_eq!(*memo.get(&[]), "static");
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_cursor_arguments_use_identity() {
        let (mut memo, runs) = counted(|args| args[0].to_string());
        let root = Structure::from_value(Value::from(vec!["a", "b"])).unwrap();
        let first = Cursor::at(root.clone(), path![0usize]);

        memo.get(&[Value::Cursor(first.clone())]);
        // Sibling changed, pointed data shared
        let sibling_changed = root.set(&1usize.into(), "z".into()).unwrap();
        memo.get(&[Value::Cursor(Cursor::at(sibling_changed, path![0usize]))]);
        assert_eq!(runs.get(), 1);

        memo.get(&[Value::Cursor(first.set("q".into()).unwrap())]);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_repeated_cursor_over_list_child_hits() {
        let (mut memo, runs) = counted(|args| args[0].to_string());
        let root = Structure::map([("items", Value::from(vec![1i64, 2]))]);
        let items = Value::Cursor(Cursor::at(root, path!["items"]));

        memo.get(&[items.clone()]);
        memo.get(&[items]);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_entry() {
        let mut memo: Memo<i64, String> = Memo::try_new(|args: &[Value]| {
            args[0]
                .as_int()
                .ok_or_else(|| format!("expected int, got {}", args[0].type_name()))
        });

        assert_eq!(memo.call(&[Value::Int(5)]), Ok(&5));
        let err = memo.call(&[Value::from("boom")]).unwrap_err();
        assert_eq!(err, "expected int, got string");

        assert_eq!(memo.cached(), Some(&5));
        assert_eq!(memo.stats().failures, 1);

        // The old arguments still hit
        assert_eq!(memo.call(&[Value::Int(5)]), Ok(&5));
        assert_eq!(memo.stats().hits, 1);
    }

    #[test]
    fn test_panic_keeps_previous_entry() {
        let mut memo = Memo::new(|args: &[Value]| {
            let n = args[0].as_int().unwrap_or(0);
            assert!(n < 2, "refusing {n}");
            n
        });
        assert_eq!(*memo.get(&[Value::Int(1)]), 1);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            memo.get(&[Value::Int(2)]);
        }));
        assert!(outcome.is_err());
        assert_eq!(memo.cached(), Some(&1));

        assert_eq!(*memo.get(&[Value::Int(1)]), 1);
        assert_eq!(memo.stats().hits, 1);
    }

    #[test]
    fn test_failure_on_first_call_caches_nothing() {
        let mut memo: Memo<(), &str> = Memo::try_new(|_: &[Value]| Err("nope"));
        assert_eq!(memo.call(&[]), Err("nope"));
        assert!(!memo.is_cached());
    }

    #[test]
    fn test_invalidate() {
        let (mut memo, runs) = counted(|_| 1);
        memo.get(&[]);
        memo.invalidate();
        assert!(!memo.is_cached());
        memo.get(&[]);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_custom_policy() {
        // Only the first argument matters
        let policy = rendergate_core::UpdatePolicy::new(
            Options::default().with_is_ignorable(|key, _| key != "0"),
        );
        let (memo, runs) = counted(|args| args.len());
        let mut memo = memo.with_policy(policy);

        memo.get(&[Value::Int(1), Value::from("a")]);
        memo.get(&[Value::Int(1), Value::from("b")]);
        assert_eq!(runs.get(), 1);
        // The cached result is from the first call
        assert_eq!(memo.cached(), Some(&2));
    }
}
