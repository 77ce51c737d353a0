//! Decision tracing for debugging re-renders
//!
//! A [`Tracer`] is owned by the host application and handed to the update
//! policy by reference. While enabled it reports every update decision, and
//! every subsequent render, for components whose name matches a regular
//! expression. Tracing only observes: it never changes a verdict.
//!
//! Events go to a [`TraceSink`]. The default [`TracingSink`] emits
//! `tracing` events at debug level on the `rendergate::trace` target; any
//! `Fn(&TraceEvent)` closure can stand in for it.
//!
//! # Example
//!
//! ```
//! use rendergate_core::{Tracer, TraceEvent};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let lines = Rc::new(RefCell::new(Vec::new()));
//! let sink = {
//!     let lines = lines.clone();
//!     move |event: &TraceEvent<'_>| lines.borrow_mut().push(event.to_string())
//! };
//!
//! let mut tracer = Tracer::new();
//! tracer.enable_with_sink("^Todo", sink).unwrap();
//! tracer.render("TodoItem");
//! tracer.render("Header");
//!
//! assert_eq!(*lines.borrow(), vec!["<TodoItem>: render".to_string()]);
//! ```

use crate::error::Result;
use crate::policy::Decision;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Environment variable read by [`TracerConfig::from_env`]
pub const TRACE_ENV_VAR: &str = "RENDERGATE_TRACE";

/// Something observed by the tracer
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// An update decision was made for a component
    Decision {
        component: &'a str,
        decision: &'a Decision,
    },
    /// A component rendered
    Render { component: &'a str },
}

impl TraceEvent<'_> {
    /// Name of the component the event is about
    pub fn component(&self) -> &str {
        match self {
            TraceEvent::Decision { component, .. } | TraceEvent::Render { component } => component,
        }
    }
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Decision {
                component,
                decision,
            } => write!(f, "<{}>: should_update => {}", component, decision),
            TraceEvent::Render { component } => write!(f, "<{}>: render", component),
        }
    }
}

/// Receives trace events
pub trait TraceSink {
    fn emit(&self, event: &TraceEvent<'_>);
}

impl<F> TraceSink for F
where
    F: Fn(&TraceEvent<'_>),
{
    fn emit(&self, event: &TraceEvent<'_>) {
        self(event)
    }
}

/// Sink that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, event: &TraceEvent<'_>) {
        match event {
            TraceEvent::Decision {
                component,
                decision,
            } => {
                let keys = decision.record().map(|r| r.keys.as_slice()).unwrap_or(&[]);
                tracing::debug!(
                    target: "rendergate::trace",
                    component = *component,
                    verdict = decision.should_update(),
                    reason = decision.reason_label(),
                    ?keys,
                    "{}",
                    event
                );
            }
            TraceEvent::Render { component } => {
                tracing::debug!(target: "rendergate::trace", component = *component, "{}", event);
            }
        }
    }
}

/// Serializable tracer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Regular expression matched against component names; `None` disables tracing
    #[serde(default)]
    pub pattern: Option<String>,
}

impl TracerConfig {
    /// Read the pattern from [`TRACE_ENV_VAR`]; unset or empty disables tracing
    pub fn from_env() -> Self {
        let pattern = std::env::var(TRACE_ENV_VAR)
            .ok()
            .filter(|p| !p.is_empty());
        Self { pattern }
    }
}

/// Reports update decisions and renders for matching components
///
/// Enabling again with a new pattern replaces the previous one.
pub struct Tracer {
    pattern: Option<Regex>,
    sink: Rc<dyn TraceSink>,
}

impl Tracer {
    /// Create a disabled tracer that logs through `tracing` once enabled
    pub fn new() -> Self {
        Self {
            pattern: None,
            sink: Rc::new(TracingSink),
        }
    }

    /// Build a tracer from configuration
    pub fn from_config(config: &TracerConfig) -> Result<Self> {
        let mut tracer = Self::new();
        if let Some(pattern) = &config.pattern {
            tracer.enable(pattern)?;
        }
        Ok(tracer)
    }

    /// Trace components whose name matches `pattern`, keeping the current sink
    pub fn enable(&mut self, pattern: &str) -> Result<()> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(())
    }

    /// Trace components whose name matches `pattern` into `sink`
    pub fn enable_with_sink(
        &mut self,
        pattern: &str,
        sink: impl TraceSink + 'static,
    ) -> Result<()> {
        self.enable(pattern)?;
        self.sink = Rc::new(sink);
        Ok(())
    }

    /// Stop tracing
    pub fn disable(&mut self) {
        self.pattern = None;
    }

    /// Check whether any pattern is active
    pub fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    /// Check whether events for `component` would be emitted
    pub fn matches(&self, component: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(component))
    }

    /// Report an update decision
    pub fn decision(&self, component: &str, decision: &Decision) {
        if self.matches(component) {
            self.sink.emit(&TraceEvent::Decision {
                component,
                decision,
            });
        }
    }

    /// Report a render that followed an update decision
    pub fn render(&self, component: &str) {
        if self.matches(component) {
            self.sink.emit(&TraceEvent::Render { component });
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .finish_non_exhaustive()
    }
}
