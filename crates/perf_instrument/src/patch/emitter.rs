use crate::host::{AddListenerFn, EventEmitterHost, Listener};
use perf_context::Profiler;
use serde_json::Value;
use std::rc::Rc;

/// Label listener time is charged under.
pub const EMITTER_LABEL: &str = "NativeEventEmitter";

/// Bind the subscribing context onto every listener.
pub(crate) fn patch_event_emitter(profiler: &Profiler, host: &dyn EventEmitterHost) {
    let profiler = profiler.clone();
    host.add_listener().intercept(move |original| {
        let patched: Rc<AddListenerFn> = Rc::new(move |event_type: &str, listener: Listener| {
            let bound = profiler.bind_current(EMITTER_LABEL, listener);
            let wrapped: Listener =
                Rc::new(move |payload: &Value| bound.invoke(|listener| listener(payload)));
            original(event_type, wrapped)
        });
        patched
    });
}
