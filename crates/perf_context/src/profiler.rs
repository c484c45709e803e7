//! The context-aware executor
//!
//! [`Profiler`] owns the context stack and the time accumulator. Every
//! transfer of control between contexts goes through
//! [`Profiler::execute_in_context`] (or a [`ContextGuard`]), which charges
//! the time since the previous boundary to whichever frame was current
//! during it.
//!
//! A single "last switch" timestamp is enough because frames are strictly
//! nested: each push is matched by a pop before the enclosing frame
//! resumes, so the time since the most recent boundary always belongs to
//! the frame on top of the stack.
//!
//! The profiler is a cheap [`Clone`] handle over shared state. It is
//! deliberately `!Send`: the accounting assumes one logical thread of
//! control, the way an event loop runs callbacks to completion.
//!
//! # Example
//!
//! ```rust
//! use perf_context::{ManualClock, Profiler, ProfilerConfig};
//!
//! let clock = ManualClock::new();
//! let profiler = Profiler::with_clock(ProfilerConfig::enabled(), clock.clone());
//!
//! profiler.execute_in_context("Feed", "render", || {
//!     clock.advance(4.0);
//!     assert_eq!(profiler.current_context().unwrap(), "Feed");
//! });
//!
//! assert!(profiler.current_context().is_none());
//! assert_eq!(profiler.perf_info().get("Feed", "render"), Some(4.0));
//! ```

use crate::accumulator::{PerfInfo, TimeAccumulator};
use crate::bind::Bound;
use crate::clock::{Clock, MonotonicClock};
use crate::config::ProfilerConfig;
use crate::context::{ContextId, ContextStack, Frame};
use crate::error::{ProfilerError, ProfilerResult};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Stack, accumulator and the last boundary timestamp.
#[derive(Debug, Default)]
struct ExecutionState {
    stack: ContextStack,
    accumulator: TimeAccumulator,
    last_switch_ms: f64,
}

struct ProfilerInner {
    config: ProfilerConfig,
    clock: Box<dyn Clock>,
    state: RefCell<ExecutionState>,
}

/// Handle to one isolated set of profiler state.
#[derive(Clone)]
pub struct Profiler {
    inner: Rc<ProfilerInner>,
}

impl fmt::Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Profiler")
            .field("config", &self.inner.config)
            .field("stack", &state.stack)
            .field("contexts", &state.accumulator.context_count())
            .finish()
    }
}

impl Profiler {
    /// Create a profiler timed by a [`MonotonicClock`].
    pub fn new(config: ProfilerConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Create a profiler with a custom clock.
    pub fn with_clock(config: ProfilerConfig, clock: impl Clock + 'static) -> Self {
        let state = ExecutionState {
            last_switch_ms: clock.now_ms(),
            ..ExecutionState::default()
        };
        Self {
            inner: Rc::new(ProfilerInner {
                config,
                clock: Box::new(clock),
                state: RefCell::new(state),
            }),
        }
    }

    /// The configuration this profiler was built with.
    pub fn config(&self) -> &ProfilerConfig {
        &self.inner.config
    }

    /// Whether instrumentation and sink reporting are active.
    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Check whether two handles share the same state.
    pub fn same_state(&self, other: &Profiler) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` with `context` current, charging elapsed time to `label`.
    ///
    /// The frame is released even if `f` panics. An empty context runs `f`
    /// without touching the stack.
    pub fn execute_in_context<C, L, R>(&self, context: C, label: L, f: impl FnOnce() -> R) -> R
    where
        C: Into<ContextId>,
        L: Into<String>,
    {
        let _frame = self.enter(context, label).ok();
        f()
    }

    /// Like [`execute_in_context`](Self::execute_in_context), but `None`
    /// leaves whatever is current in place.
    pub fn execute_in_optional_context<L, R>(
        &self,
        context: Option<&ContextId>,
        label: L,
        f: impl FnOnce() -> R,
    ) -> R
    where
        L: Into<String>,
    {
        match context {
            Some(context) => self.execute_in_context(context, label, f),
            None => f(),
        }
    }

    /// Push `context` and return a guard that pops it on drop.
    ///
    /// Guards must be dropped in reverse order of creation.
    pub fn enter<C, L>(&self, context: C, label: L) -> ProfilerResult<ContextGuard<'_>>
    where
        C: Into<ContextId>,
        L: Into<String>,
    {
        let context = context.into();
        if context.is_empty() {
            return Err(ProfilerError::EmptyContext);
        }
        let frame = Frame::new(context, label);

        let now = self.inner.clock.now_ms();
        let mut state = self.inner.state.borrow_mut();
        state.accumulator.ensure_context(&frame.context);
        if let Some(previous) = state.stack.top().cloned() {
            let elapsed = now - state.last_switch_ms;
            state
                .accumulator
                .charge(&previous.context, &previous.label, elapsed);
        }
        state.last_switch_ms = now;

        tracing::trace!(
            target: "perf::context",
            context = %frame.context,
            label = %frame.label,
            depth = state.stack.depth() + 1,
            "enter context"
        );
        state.stack.push(frame);
        let depth = state.stack.depth();

        Ok(ContextGuard {
            profiler: self,
            depth,
        })
    }

    fn exit(&self, expected_depth: usize) {
        let now = self.inner.clock.now_ms();
        let mut state = self.inner.state.borrow_mut();
        if state.stack.depth() != expected_depth {
            tracing::warn!(
                target: "perf::context",
                expected = expected_depth,
                actual = state.stack.depth(),
                "context frames released out of order"
            );
        }
        if let Some(frame) = state.stack.pop() {
            let elapsed = now - state.last_switch_ms;
            state.accumulator.charge(&frame.context, &frame.label, elapsed);
            tracing::trace!(
                target: "perf::context",
                context = %frame.context,
                label = %frame.label,
                "exit context"
            );
        }
        state.last_switch_ms = now;
    }

    /// The context on top of the stack.
    pub fn current_context(&self) -> Option<ContextId> {
        self.inner.state.borrow().stack.current().cloned()
    }

    /// Active contexts rendered outermost first, e.g. `Root->Feed`.
    pub fn context_chain(&self) -> String {
        self.inner.state.borrow().stack.chain()
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.inner.state.borrow().stack.depth()
    }

    /// Snapshot of accumulated time per context and label.
    pub fn perf_info(&self) -> PerfInfo {
        self.inner.state.borrow().accumulator.snapshot()
    }

    /// Zero all accumulated durations. Keys are kept.
    pub fn clear_perf_info(&self) {
        self.inner.state.borrow_mut().accumulator.clear();
        tracing::debug!(target: "perf::context", "perf info cleared");
    }

    /// Freeze `context` onto `f` so a later call re-enters it.
    pub fn bind_context<F>(
        &self,
        context: Option<ContextId>,
        label: impl Into<String>,
        f: F,
    ) -> Bound<F> {
        Bound::new(self.clone(), context, label.into(), f)
    }

    /// Freeze whatever context is current right now onto `f`.
    pub fn bind_current<F>(&self, label: impl Into<String>, f: F) -> Bound<F> {
        self.bind_context(self.current_context(), label, f)
    }
}

/// Keeps a context frame pushed until dropped.
#[must_use = "the context is popped as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    profiler: &'a Profiler,
    depth: usize,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.profiler.exit(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::thread::sleep;
    use std::time::Duration;

    fn manual() -> (Profiler, ManualClock) {
        let clock = ManualClock::new();
        (
            Profiler::with_clock(ProfilerConfig::enabled(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_nested_contexts_visible() {
        let (profiler, _) = manual();
        let inner = profiler.execute_in_context("A", "a", || {
            profiler.execute_in_context("B", "b", || profiler.current_context())
        });
        assert_eq!(inner.unwrap(), "B");
        assert!(profiler.current_context().is_none());
    }

    #[test]
    fn test_returns_inner_result() {
        let (profiler, _) = manual();
        let value = profiler.execute_in_context("A", "a", || 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_nested_time_attribution() {
        let (profiler, clock) = manual();

        profiler.execute_in_context("A", "outer", || {
            clock.advance(2.0);
            profiler.execute_in_context("B", "inner", || clock.advance(5.0));
            clock.advance(3.0);
        });

        let info = profiler.perf_info();
        assert_eq!(info.get("A", "outer"), Some(5.0));
        assert_eq!(info.get("B", "inner"), Some(5.0));
    }

    #[test]
    fn test_time_outside_contexts_not_charged() {
        let (profiler, clock) = manual();
        clock.advance(100.0);
        profiler.execute_in_context("A", "x", || clock.advance(1.0));
        clock.advance(100.0);
        profiler.execute_in_context("A", "x", || clock.advance(1.0));

        assert_eq!(profiler.perf_info().get("A", "x"), Some(2.0));
    }

    #[test]
    fn test_reentrant_same_context() {
        let (profiler, clock) = manual();
        profiler.execute_in_context("A", "x", || {
            clock.advance(1.0);
            profiler.execute_in_context("A", "x", || {
                assert_eq!(profiler.depth(), 2);
                clock.advance(1.0);
            });
        });
        assert_eq!(profiler.perf_info().get("A", "x"), Some(2.0));
    }

    #[test]
    fn test_outer_label_kept_after_nested_return() {
        let (profiler, clock) = manual();
        profiler.execute_in_context("A", "outer", || {
            profiler.execute_in_context("B", "first", || clock.advance(1.0));
            clock.advance(2.0);
            profiler.execute_in_context("C", "second", || clock.advance(1.0));
        });

        let info = profiler.perf_info();
        assert_eq!(info.get("A", "outer"), Some(2.0));
        assert!(info.get("A", "first").is_none());
    }

    #[test]
    fn test_empty_context_falls_through() {
        let (profiler, _) = manual();
        profiler.execute_in_context("A", "x", || {
            let seen = profiler.execute_in_context("", "y", || profiler.current_context());
            assert_eq!(seen.unwrap(), "A");
        });
        assert!(!profiler.perf_info().contains(""));
    }

    #[test]
    fn test_optional_context_none_keeps_current() {
        let (profiler, _) = manual();
        profiler.execute_in_context("A", "x", || {
            let seen = profiler.execute_in_optional_context(None, "y", || profiler.current_context());
            assert_eq!(seen.unwrap(), "A");
        });
    }

    #[test]
    fn test_frame_released_on_panic() {
        let (profiler, clock) = manual();
        let result = catch_unwind(AssertUnwindSafe(|| {
            profiler.execute_in_context("A", "x", || {
                clock.advance(1.0);
                panic!("callback failed");
            })
        }));

        assert!(result.is_err());
        assert_eq!(profiler.depth(), 0);
        assert_eq!(profiler.perf_info().get("A", "x"), Some(1.0));
    }

    #[test]
    fn test_enter_rejects_empty_context() {
        let (profiler, _) = manual();
        assert!(matches!(
            profiler.enter("", "x"),
            Err(ProfilerError::EmptyContext)
        ));
    }

    #[test]
    fn test_guards_nest() {
        let (profiler, clock) = manual();
        {
            let _outer = profiler.enter("A", "a").unwrap();
            clock.advance(1.0);
            {
                let _inner = profiler.enter("B", "b").unwrap();
                assert_eq!(profiler.context_chain(), "A->B");
                clock.advance(2.0);
            }
            assert_eq!(profiler.current_context().unwrap(), "A");
        }
        let info = profiler.perf_info();
        assert_eq!(info.get("A", "a"), Some(1.0));
        assert_eq!(info.get("B", "b"), Some(2.0));
    }

    #[test]
    fn test_clear_then_resume() {
        let (profiler, clock) = manual();
        profiler.execute_in_context("A", "x", || clock.advance(3.0));
        profiler.execute_in_context("B", "y", || clock.advance(3.0));

        profiler.clear_perf_info();
        let info = profiler.perf_info();
        assert_eq!(info.total_for("A"), 0.0);
        assert_eq!(info.total_for("B"), 0.0);
        assert!(info.contains("A"));

        profiler.execute_in_context("A", "x", || clock.advance(1.0));
        assert_eq!(profiler.perf_info().get("A", "x"), Some(1.0));
    }

    #[test]
    fn test_busy_wait_attribution_with_real_clock() {
        let profiler = Profiler::new(ProfilerConfig::enabled());
        for _ in 0..2 {
            profiler.execute_in_context("A", "x", || sleep(Duration::from_millis(10)));
        }
        let total = profiler.perf_info().get("A", "x").unwrap();
        assert!(total >= 20.0, "expected at least 20ms, got {}", total);
    }

    #[test]
    fn test_instances_are_isolated() {
        let (first, _) = manual();
        let (second, _) = manual();
        first.execute_in_context("A", "x", || {
            assert!(second.current_context().is_none());
        });
        assert!(!second.perf_info().contains("A"));
        assert!(first.same_state(&first.clone()));
        assert!(!first.same_state(&second));
    }
}
