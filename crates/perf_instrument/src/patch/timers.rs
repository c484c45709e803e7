use crate::error::{PatchError, PatchResult};
use crate::host::{ScheduleFn, TimerCallback, TimerHost, TimerKind};
use perf_events::IntervalReporter;
use std::rc::Rc;

/// Interval scope of timer callbacks.
pub const TIMER_SCOPE: &str = "Timer";

/// Wrap the `kind` entry point so fired callbacks run, and are reported,
/// in the context that scheduled them. Returns the wrapped entry point.
pub(crate) fn patch_timer(
    reporter: &IntervalReporter,
    host: &dyn TimerHost,
    kind: TimerKind,
) -> PatchResult<Rc<ScheduleFn>> {
    let entry = host
        .timer(kind)
        .ok_or_else(|| PatchError::MissingCollaborator {
            patch: kind.name().to_string(),
        })?;

    let reporter = reporter.clone();
    entry.intercept(move |original| {
        let patched: Rc<ScheduleFn> = Rc::new(move |mut callback: TimerCallback, delay_ms: f64| {
            let context = reporter.profiler().current_context();
            let reporter = reporter.clone();
            let fire: TimerCallback = Box::new(move || {
                reporter.time_and_log_in_scope(
                    || callback(),
                    kind.name(),
                    context.as_ref(),
                    TIMER_SCOPE,
                )
            });
            original(fire, delay_ms)
        });
        patched
    });

    Ok(entry.get())
}
