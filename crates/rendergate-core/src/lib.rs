//! Rendergate Core - Cursor-aware equality and re-render decisions
//!
//! This crate decides whether a view needs to re-render, given its previous
//! and next inputs:
//! - Dynamic value types (`Value`, `ValueMap`, `PropertySet`)
//! - Persistent structures with structural sharing (`Structure`)
//! - Cursors into persistent structures (`Cursor`)
//! - The equality engine (`is_equal`) and its configuration (`Options`)
//! - The update-decision policy (`UpdatePolicy`, `Decision`)
//! - Decision tracing for debugging (`Tracer`)
//!
//! ## Comparison Model
//!
//! Values are classified as cursors, immutable structures or plain values.
//! Cursors are equal when they point at the same data, structures when they
//! are the same reference, plain values when they are structurally equal.
//! Because persistent structures share unchanged subtrees, reference checks
//! are enough to detect "nothing changed" for most of a large state tree.
//!
//! Everything here is single-threaded and synchronous: it runs inline in the
//! host's render pass.

mod cursor;
mod equality;
mod error;
mod options;
pub mod policy;
mod structure;
pub mod trace;
mod value;

pub use cursor::Cursor;
pub use equality::{is_equal, Kind};
pub use error::{Error, Result};
pub use options::{
    EqualityFn, IgnorePredicate, Options, StateEqualityFn, UnwrapFn, ValuePredicate, STATICS_KEY,
};
pub use policy::{Decision, DecisionRecord, Reason, SkipReason, UpdatePolicy};
pub use structure::{Node, Path, Segment, Structure};
pub use trace::{TraceEvent, TraceSink, Tracer, TracerConfig, TracingSink, TRACE_ENV_VAR};
pub use value::{Callback, PropertySet, Value, ValueMap};
