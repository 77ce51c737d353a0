//! Rendergate Memo - Single-slot memoization keyed by the update policy
//!
//! Wraps a pure computation so that calling it again with arguments the
//! [`UpdatePolicy`](rendergate_core::UpdatePolicy) considers unchanged returns
//! the previous result instead of recomputing. Typical use is derived data
//! recomputed during a render pass:
//!
//! ```
//! use rendergate_core::{Structure, Value};
//! use rendergate_memo::Memo;
//!
//! let mut visible_count = Memo::new(|args: &[Value]| {
//!     args[0].as_structure().map_or(0, |todos| todos.len())
//! });
//!
//! let todos = Structure::list(vec!["a", "b"]);
//! assert_eq!(*visible_count.get(&[Value::from(todos.clone())]), 2);
//! // Same structure reference: served from the cache
//! assert_eq!(*visible_count.get(&[Value::from(todos)]), 2);
//! assert_eq!(visible_count.stats().misses, 1);
//! ```

mod memo;
mod stats;

pub use memo::Memo;
pub use stats::MemoStats;
