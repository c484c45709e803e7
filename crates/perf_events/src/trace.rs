//! Pairing of low-level begin/end trace calls.
//!
//! The runtime's trace hook reports `begin(message)` / `end()` pairs with no
//! identifier on the end call, so pairing is positional: every begin pushes
//! a pending entry, every end pops one. Only messages starting with the
//! configured prefix reach the sink, but filtered messages still occupy a
//! stack slot so that their `end()` does not close someone else's interval.

use crate::sink::{EventSink, EventStatus, IntervalEvent};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Scope of intervals created from trace-hook calls.
pub const TRACE_SCOPE: &str = "Systrace";

struct PendingInterval {
    /// `Some` when the begin was reportable
    event: Option<Box<dyn IntervalEvent>>,
}

/// Stack of in-flight trace intervals.
pub struct TraceEventStack {
    sink: Rc<dyn EventSink>,
    prefix: String,
    pending: RefCell<Vec<PendingInterval>>,
}

impl TraceEventStack {
    /// Create an empty stack reporting messages that start with `prefix`.
    pub fn new(sink: Rc<dyn EventSink>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Handle a trace begin.
    ///
    /// `context_chain` is the active context chain (`outer->inner`) and is
    /// embedded in the interval description. Returns whether the interval
    /// was reported.
    pub fn begin(&self, message: Option<&str>, context_chain: &str) -> bool {
        let name = message.and_then(|message| message.strip_prefix(self.prefix.as_str()));

        let event = name.map(|name| {
            let mut event = self
                .sink
                .create_event(TRACE_SCOPE, &format!("require({})", name));
            event.begin_interval(&format!("{} ([{}])", name, context_chain));
            event
        });
        let reported = event.is_some();

        tracing::trace!(
            target: "perf::events",
            message = message.unwrap_or_default(),
            reported = reported,
            "trace begin"
        );
        self.pending.borrow_mut().push(PendingInterval { event });
        reported
    }

    /// Handle a trace end. Unmatched ends are ignored.
    ///
    /// Returns whether a reported interval was closed.
    pub fn end(&self) -> bool {
        let popped = self.pending.borrow_mut().pop();
        match popped {
            Some(PendingInterval {
                event: Some(mut event),
            }) => {
                event.end_interval(EventStatus::Completed);
                true
            }
            Some(PendingInterval { event: None }) => false,
            None => {
                tracing::trace!(target: "perf::events", "unmatched trace end ignored");
                false
            }
        }
    }

    /// Number of begins still waiting for their end.
    pub fn depth(&self) -> usize {
        self.pending.borrow().len()
    }

    /// The reportable prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Debug for TraceEventStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceEventStack")
            .field("prefix", &self.prefix)
            .field("depth", &self.depth())
            .finish()
    }
}
