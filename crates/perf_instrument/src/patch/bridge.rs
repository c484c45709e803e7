use crate::error::{PatchError, PatchResult};
use crate::host::{BridgeCallback, EnqueueFn, NativeBridge, NativeCall};
use perf_context::{ContextId, Profiler};
use serde_json::Value;
use std::rc::Rc;

/// Bind the enqueueing context onto both completions of every native call,
/// labelled `"<module>.<method>"`.
///
/// Without lookup tables there is nothing to label with, so the bridge is
/// left alone.
pub(crate) fn patch_bridge(profiler: &Profiler, bridge: &dyn NativeBridge) -> PatchResult<()> {
    let tables = bridge
        .remote_tables()
        .ok_or(PatchError::MissingLookupTables)?;

    let profiler = profiler.clone();
    bridge.enqueue_native_call().intercept(move |original| {
        let patched: Rc<EnqueueFn> = Rc::new(
            move |call: NativeCall,
                  on_success: Option<BridgeCallback>,
                  on_failure: Option<BridgeCallback>| {
                let context = profiler.current_context();
                let label = tables.label(call.module_id, call.method_id);
                let on_success =
                    on_success.map(|cb| bind_completion(&profiler, context.clone(), &label, cb));
                let on_failure =
                    on_failure.map(|cb| bind_completion(&profiler, context, &label, cb));
                original(call, on_success, on_failure)
            },
        );
        patched
    });

    Ok(())
}

fn bind_completion(
    profiler: &Profiler,
    context: Option<ContextId>,
    label: &str,
    callback: BridgeCallback,
) -> BridgeCallback {
    let bound = profiler.bind_context(context, label, callback);
    Box::new(move |result: Value| bound.invoke_once(move |callback| callback(result)))
}
