//! Context Propagation and Time Accounting
//!
//! This crate tracks which logical context is "currently executing" across
//! callback-driven control flow, and attributes elapsed time to
//! `(context, label)` pairs:
//! - A monotonic [`Clock`] abstraction with a manual clock for tests
//! - A LIFO [`ContextStack`] of active frames
//! - A [`TimeAccumulator`] charged at every context switch
//! - The [`Profiler`] executor, which pushes/pops contexts around a call
//! - [`Bound`] callbacks that re-enter the context they were registered in
//!
//! # Example
//!
//! ```rust
//! use perf_context::{Profiler, ProfilerConfig};
//!
//! let profiler = Profiler::new(ProfilerConfig::enabled());
//!
//! let callback = profiler.execute_in_context("Settings", "mount", || {
//!     let p = profiler.clone();
//!     profiler.bind_current("onSave", move || p.current_context())
//! });
//!
//! let context = callback.invoke(|f| f());
//! assert_eq!(context.unwrap(), "Settings");
//! assert!(profiler.perf_info().contains("Settings"));
//! ```

mod accumulator;
mod bind;
mod clock;
mod config;
mod context;
mod error;
mod profiler;

pub use accumulator::{LabelTimes, PerfInfo, TimeAccumulator};
pub use bind::Bound;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{
    ProfilerConfig, DEFAULT_SCOPE, DEFAULT_TRACE_PREFIX, DEFAULT_UNTRACKABLE_CONTEXT,
};
pub use context::{ContextId, ContextStack, Frame};
pub use error::{ProfilerError, ProfilerResult};
pub use profiler::{ContextGuard, Profiler};
