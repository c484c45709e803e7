//! Context-binding wrapper for deferred callbacks

use crate::context::ContextId;
use crate::profiler::Profiler;
use std::fmt;

/// A callback with the context of its registration frozen onto it.
///
/// Created by [`Profiler::bind_context`] or [`Profiler::bind_current`].
/// Invoking it re-enters the captured context through the executor, no
/// matter what is current at the call site. With no captured context the
/// call runs under whatever is current at invocation time.
///
/// # Example
///
/// ```rust
/// use perf_context::{Profiler, ProfilerConfig};
///
/// let profiler = Profiler::new(ProfilerConfig::enabled());
/// let bound = profiler.execute_in_context("Inbox", "subscribe", || {
///     let p = profiler.clone();
///     profiler.bind_current("onMessage", move || p.current_context())
/// });
///
/// // Later, from an unrelated call site:
/// let seen = bound.invoke(|callback| callback());
/// assert_eq!(seen.unwrap(), "Inbox");
/// ```
pub struct Bound<F> {
    profiler: Profiler,
    context: Option<ContextId>,
    label: String,
    f: F,
}

impl<F> Bound<F> {
    pub(crate) fn new(profiler: Profiler, context: Option<ContextId>, label: String, f: F) -> Self {
        Self {
            profiler,
            context: context.filter(|context| !context.is_empty()),
            label,
            f,
        }
    }

    /// The captured context, if one was active at registration.
    pub fn context(&self) -> Option<&ContextId> {
        self.context.as_ref()
    }

    /// Label the callback's time is charged under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the binding and call the wrapped callback once.
    pub fn invoke_once<R>(self, call: impl FnOnce(F) -> R) -> R {
        let Self {
            profiler,
            context,
            label,
            f,
        } = self;
        profiler.execute_in_optional_context(context.as_ref(), label, || call(f))
    }

    /// Call a wrapped callback that needs mutable access.
    pub fn invoke_mut<R>(&mut self, call: impl FnOnce(&mut F) -> R) -> R {
        let f = &mut self.f;
        self.profiler
            .execute_in_optional_context(self.context.as_ref(), self.label.as_str(), || call(f))
    }

    /// Call the wrapped callback by shared reference.
    pub fn invoke<R>(&self, call: impl FnOnce(&F) -> R) -> R {
        self.profiler
            .execute_in_optional_context(self.context.as_ref(), self.label.as_str(), || {
                call(&self.f)
            })
    }
}

impl<F> fmt::Debug for Bound<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("context", &self.context)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
