//! Interval Events
//!
//! This crate connects context-aware execution to an external
//! event-recording sink:
//!
//! - [`EventSink`] / [`IntervalEvent`] - the begin/end interval interface a
//!   profiling UI implements
//! - [`IntervalReporter`] - brackets work with an interval while running it
//!   in a context (`time_and_log`)
//! - [`TraceEventStack`] - positional pairing of low-level trace begin/end
//!   calls with prefix filtering
//! - [`RecordingSink`] and [`TracingSink`] - concrete sinks
//!
//! # Modules
//!
//! - [`sink`] - sink traits and interval status
//! - [`reporter`] - interval reporting
//! - [`trace`] - trace-hook pairing
//! - [`recording`] - in-memory recording sink

pub mod recording;
pub mod reporter;
pub mod sink;
pub mod trace;
mod tracing_sink;

pub use recording::{RecordingSink, SinkRecord};
pub use reporter::{describe, IntervalReporter};
pub use sink::{EventSink, EventStatus, IntervalEvent};
pub use trace::{TraceEventStack, TRACE_SCOPE};
pub use tracing_sink::TracingSink;
