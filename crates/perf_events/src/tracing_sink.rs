//! Sink that forwards intervals to `tracing`.

use crate::sink::{EventSink, EventStatus, IntervalEvent};
use std::time::Instant;

/// Emits one `tracing` event when an interval opens and one when it
/// closes, the latter carrying the wall time in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

struct TracedInterval {
    scope: String,
    name: String,
    started: Option<Instant>,
}

impl IntervalEvent for TracedInterval {
    fn begin_interval(&mut self, description: &str) {
        self.started = Some(Instant::now());
        tracing::debug!(
            target: "perf::events",
            scope = %self.scope,
            name = %self.name,
            description = description,
            "interval begin"
        );
    }

    fn end_interval(&mut self, status: EventStatus) {
        let elapsed_ms = self
            .started
            .take()
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        tracing::debug!(
            target: "perf::events",
            scope = %self.scope,
            name = %self.name,
            status = ?status,
            elapsed_ms = elapsed_ms,
            "interval end"
        );
    }
}

impl EventSink for TracingSink {
    fn create_event(&self, scope: &str, name: &str) -> Box<dyn IntervalEvent> {
        Box::new(TracedInterval {
            scope: scope.to_string(),
            name: name.to_string(),
            started: None,
        })
    }
}
