//! Single entry point for applications

use crate::installer::{AttachReport, Installer, Runtime};
use perf_context::{ContextId, PerfInfo, Profiler, ProfilerConfig};
use perf_events::{EventSink, IntervalReporter, TracingSink};
use std::rc::Rc;

/// Profiler, reporter and installer wired together.
///
/// Cloning the underlying [`Profiler`] shares state, but each
/// `Instrumentation` owns its own side tables, so two instances never see
/// each other's contexts unless built from the same profiler.
#[derive(Debug)]
pub struct Instrumentation {
    installer: Installer,
    reporter: IntervalReporter,
}

impl Instrumentation {
    /// Instrumentation reporting intervals to `tracing`.
    pub fn new(config: ProfilerConfig) -> Self {
        Self::with_sink(config, Rc::new(TracingSink))
    }

    /// Instrumentation reporting intervals to `sink`.
    pub fn with_sink(config: ProfilerConfig, sink: Rc<dyn EventSink>) -> Self {
        Self::with_parts(Profiler::new(config), sink)
    }

    /// Build around an existing profiler, e.g. one driven by a manual clock.
    pub fn with_parts(profiler: Profiler, sink: Rc<dyn EventSink>) -> Self {
        let reporter = IntervalReporter::new(profiler, sink);
        Self {
            installer: Installer::new(reporter.clone()),
            reporter,
        }
    }

    /// Patch every collaborator `runtime` provides. A no-op when disabled.
    pub fn attach(&self, runtime: &Runtime<'_>) -> AttachReport {
        self.installer.attach(runtime)
    }

    /// Run `f` with `context` current, charging its time to `label`.
    pub fn execute_in_context<R>(
        &self,
        context: impl Into<ContextId>,
        label: impl Into<String>,
        f: impl FnOnce() -> R,
    ) -> R {
        self.profiler().execute_in_context(context, label, f)
    }

    /// The innermost active context.
    pub fn get_context(&self) -> Option<ContextId> {
        self.profiler().current_context()
    }

    /// Snapshot of accumulated time per context and label.
    pub fn perf_info(&self) -> PerfInfo {
        self.profiler().perf_info()
    }

    /// Zero accumulated time; known contexts and labels stay listed.
    pub fn clear_perf_info(&self) {
        self.profiler().clear_perf_info()
    }

    /// Time `f` as an interval in the default scope.
    pub fn time_and_log<R>(
        &self,
        f: impl FnOnce() -> R,
        message: &str,
        context: Option<&ContextId>,
    ) -> R {
        self.reporter.time_and_log(f, message, context)
    }

    /// Time `f` as an interval in `scope`.
    pub fn time_and_log_in_scope<R>(
        &self,
        f: impl FnOnce() -> R,
        message: &str,
        context: Option<&ContextId>,
        scope: &str,
    ) -> R {
        self.reporter.time_and_log_in_scope(f, message, context, scope)
    }

    /// The shared profiler.
    pub fn profiler(&self) -> &Profiler {
        self.reporter.profiler()
    }

    /// The interval reporter.
    pub fn reporter(&self) -> &IntervalReporter {
        &self.reporter
    }

    /// The installer holding patch state.
    pub fn installer(&self) -> &Installer {
        &self.installer
    }
}

impl Default for Instrumentation {
    fn default() -> Self {
        Self::new(ProfilerConfig::default())
    }
}
