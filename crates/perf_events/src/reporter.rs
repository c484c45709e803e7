//! Interval reporting around context-aware execution

use crate::sink::{EventSink, EventStatus, IntervalEvent};
use perf_context::{ContextId, Profiler};
use std::fmt;
use std::rc::Rc;

/// Brackets work with begin/end notifications to an [`EventSink`] while
/// running it through the profiler's executor.
///
/// When the profiler's configuration is disabled the work runs directly,
/// with no sink interaction and no context switch.
///
/// # Example
///
/// ```rust
/// use perf_context::{ContextId, Profiler, ProfilerConfig};
/// use perf_events::{IntervalReporter, RecordingSink};
/// use std::rc::Rc;
///
/// let sink = RecordingSink::new();
/// let reporter = IntervalReporter::new(
///     Profiler::new(ProfilerConfig::enabled()),
///     Rc::new(sink.clone()),
/// );
///
/// let context = ContextId::new("Feed");
/// let rows = reporter.time_and_log(|| 3, "loadRows", Some(&context));
///
/// assert_eq!(rows, 3);
/// assert_eq!(sink.began(), vec!["loadRows [Feed]".to_string()]);
/// ```
#[derive(Clone)]
pub struct IntervalReporter {
    profiler: Profiler,
    sink: Rc<dyn EventSink>,
}

impl fmt::Debug for IntervalReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalReporter")
            .field("profiler", &self.profiler)
            .finish_non_exhaustive()
    }
}

impl IntervalReporter {
    /// Create a reporter over a profiler and a sink.
    pub fn new(profiler: Profiler, sink: Rc<dyn EventSink>) -> Self {
        Self { profiler, sink }
    }

    /// The profiler work is executed through.
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// The sink intervals are reported to.
    pub fn sink(&self) -> &Rc<dyn EventSink> {
        &self.sink
    }

    /// Time `f` under the configured default scope.
    pub fn time_and_log<R>(
        &self,
        f: impl FnOnce() -> R,
        message: &str,
        context: Option<&ContextId>,
    ) -> R {
        let scope = self.profiler.config().default_scope.clone();
        self.time_and_log_in_scope(f, message, context, &scope)
    }

    /// Open an interval tagged `(scope, message)`, run `f` in `context`
    /// with `message` as its label, close the interval and return `f`'s
    /// result.
    pub fn time_and_log_in_scope<R>(
        &self,
        f: impl FnOnce() -> R,
        message: &str,
        context: Option<&ContextId>,
        scope: &str,
    ) -> R {
        if !self.profiler.is_enabled() {
            return f();
        }

        let mut event = self.sink.create_event(scope, message);
        event.begin_interval(&describe(message, context));
        let interval = OpenInterval { event: Some(event) };

        let result = self
            .profiler
            .execute_in_optional_context(context, message, f);
        interval.close(EventStatus::Completed);
        result
    }
}

/// `"<message> [<context>]"`, or the bare message with no context.
pub fn describe(message: &str, context: Option<&ContextId>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!("{} [{}]", message, context),
        _ => message.to_string(),
    }
}

/// Closes its interval as failed if dropped without [`close`](Self::close).
struct OpenInterval {
    event: Option<Box<dyn IntervalEvent>>,
}

impl OpenInterval {
    fn close(mut self, status: EventStatus) {
        if let Some(mut event) = self.event.take() {
            event.end_interval(status);
        }
    }
}

impl Drop for OpenInterval {
    fn drop(&mut self) {
        if let Some(mut event) = self.event.take() {
            event.end_interval(EventStatus::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSink;
    use perf_context::{ManualClock, ProfilerConfig};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn reporter(config: ProfilerConfig) -> (IntervalReporter, RecordingSink, ManualClock) {
        let clock = ManualClock::new();
        let sink = RecordingSink::new();
        let reporter = IntervalReporter::new(
            Profiler::with_clock(config, clock.clone()),
            Rc::new(sink.clone()),
        );
        (reporter, sink, clock)
    }

    #[test]
    fn test_time_and_log_reports_interval() {
        let (reporter, sink, _) = reporter(ProfilerConfig::enabled());
        let module = ContextId::new("testModule");

        reporter.time_and_log(|| (), "testMessage", Some(&module));

        assert_eq!(
            sink.created(),
            vec![("General".to_string(), "testMessage".to_string())]
        );
        assert_eq!(sink.began(), vec!["testMessage [testModule]".to_string()]);
        assert_eq!(sink.ended(), vec![EventStatus::Completed]);
    }

    #[test]
    fn test_time_and_log_returns_result() {
        let (reporter, _, _) = reporter(ProfilerConfig::enabled());
        let module = ContextId::new("testModule");
        let result = reporter.time_and_log(|| "RESULT", "testMessage", Some(&module));
        assert_eq!(result, "RESULT");
    }

    #[test]
    fn test_time_and_log_runs_in_context() {
        let (reporter, _, clock) = reporter(ProfilerConfig::enabled());
        let module = ContextId::new("Feed");
        let profiler = reporter.profiler().clone();

        let seen = reporter.time_and_log_in_scope(
            || {
                clock.advance(7.0);
                profiler.current_context()
            },
            "setTimeout",
            Some(&module),
            "Timer",
        );

        assert_eq!(seen.unwrap(), "Feed");
        assert_eq!(profiler.perf_info().get("Feed", "setTimeout"), Some(7.0));
    }

    #[test]
    fn test_disabled_is_pass_through() {
        let (reporter, sink, _) = reporter(ProfilerConfig::disabled());
        let module = ContextId::new("Feed");
        let profiler = reporter.profiler().clone();

        let seen = reporter.time_and_log(|| profiler.current_context(), "load", Some(&module));

        assert!(seen.is_none());
        assert!(sink.records().is_empty());
        assert!(profiler.perf_info().is_empty());
    }

    #[test]
    fn test_disabled_propagates_panics_unchanged() {
        let (reporter, sink, _) = reporter(ProfilerConfig::disabled());
        let result = catch_unwind(AssertUnwindSafe(|| {
            reporter.time_and_log(|| panic!("boom"), "load", None)
        }));
        assert!(result.is_err());
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_panic_closes_interval_as_failed() {
        let (reporter, sink, _) = reporter(ProfilerConfig::enabled());
        let module = ContextId::new("Feed");

        let result = catch_unwind(AssertUnwindSafe(|| {
            reporter.time_and_log(|| panic!("boom"), "load", Some(&module))
        }));

        assert!(result.is_err());
        assert_eq!(sink.ended(), vec![EventStatus::Failed]);
        assert_eq!(reporter.profiler().depth(), 0);
    }

    #[test]
    fn test_describe_without_context() {
        assert_eq!(describe("load", None), "load");
        assert_eq!(describe("load", Some(&ContextId::new(""))), "load");
    }
}
