use crate::host::{AnimatedHost, AnimationEnd, AnimationEndCallback, AnimationStart, StartAnimationFn};
use perf_context::{ContextId, Profiler};
use std::rc::Rc;

/// Label animation completions are charged under.
pub const ANIMATION_LABEL: &str = "startAnimatingNode";

/// Bind the starting context onto every animation's completion callback.
/// Animations started outside any context are charged to `untrackable`.
pub(crate) fn patch_animated(profiler: &Profiler, untrackable: ContextId, host: &dyn AnimatedHost) {
    let profiler = profiler.clone();
    host.start_animating_node().intercept(move |original| {
        let patched: Rc<StartAnimationFn> = Rc::new(
            move |start: AnimationStart, on_end: Option<AnimationEndCallback>| {
                let context = profiler
                    .current_context()
                    .unwrap_or_else(|| untrackable.clone());
                let on_end = on_end.map(|callback| {
                    let bound = profiler.bind_context(Some(context), ANIMATION_LABEL, callback);
                    let wrapped: AnimationEndCallback = Box::new(move |end: AnimationEnd| {
                        bound.invoke_once(move |callback| callback(end))
                    });
                    wrapped
                });
                original(start, on_end)
            },
        );
        patched
    });
}
