use crate::error::{PatchError, PatchResult};
use crate::host::{TraceBeginFn, TraceEndFn, TraceHost};
use perf_context::Profiler;
use perf_events::TraceEventStack;
use std::rc::Rc;

/// Route the runtime's trace hook into `events`, describing each begin
/// with the context chain active at that moment.
pub(crate) fn patch_trace_hook(
    profiler: &Profiler,
    events: &Rc<TraceEventStack>,
    host: &dyn TraceHost,
) -> PatchResult<()> {
    let hook = host.trace_hook().ok_or(PatchError::MissingTraceHook)?;

    let begin: Rc<TraceBeginFn> = {
        let profiler = profiler.clone();
        let events = Rc::clone(events);
        Rc::new(move |message: Option<&str>| {
            events.begin(message, &profiler.context_chain());
        })
    };
    let end: Rc<TraceEndFn> = {
        let events = Rc::clone(events);
        Rc::new(move || {
            events.end();
        })
    };

    hook.begin.replace(begin);
    hook.end.replace(end);
    Ok(())
}
