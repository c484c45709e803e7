//! Runtime Instrumentation
//!
//! Decorates a callback-driven runtime so that every asynchronous callback
//! runs in the context that registered it:
//! - Timers (`setTimeout` and friends), reported as intervals in scope `Timer`
//! - Native bridge completions, labelled `"<module>.<method>"`
//! - Event emitter listeners
//! - Application registration and run
//! - Animation completion callbacks
//! - The low-level trace hook, paired into `Systrace` intervals
//!
//! Collaborators are described by the traits in [`host`]. Each exposes its
//! entry points as [`EntryPoint`]s which [`Installer::attach`] decorates.
//!
//! # Example
//!
//! ```rust
//! use perf_instrument::{Instrumentation, ProfilerConfig, Runtime};
//!
//! let instrumentation = Instrumentation::new(ProfilerConfig::enabled());
//! let report = instrumentation.attach(&Runtime::new());
//! assert!(report.applied.is_empty());
//!
//! instrumentation.execute_in_context("Home", "render", || {
//!     assert_eq!(instrumentation.get_context().unwrap(), "Home");
//! });
//! assert!(instrumentation.perf_info().contains("Home"));
//! ```

mod entry;
mod error;
mod global;
pub mod host;
mod installer;
mod instrumentation;
mod patch;

pub use entry::EntryPoint;
pub use error::{PatchError, PatchResult};
pub use global::{backup_name, install_property, GlobalScope, InstallOutcome, PropertyDescriptor};
pub use installer::{AttachReport, Installer, PatchKind, Runtime};
pub use instrumentation::Instrumentation;
pub use patch::{AppContextTable, ANIMATION_LABEL, EMITTER_LABEL, RUN_LABEL, TIMER_SCOPE};

pub use perf_context::{ContextId, PerfInfo, Profiler, ProfilerConfig};
pub use perf_events::{EventSink, EventStatus, IntervalReporter, RecordingSink, TracingSink};
