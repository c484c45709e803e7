//! Attaching every patch to a runtime

use crate::error::{PatchError, PatchResult};
use crate::global::install_property;
use crate::host::{
    AnimatedHost, AppRegistryHost, EventEmitterHost, NativeBridge, TimerGlobals, TimerHost,
    TimerKind, TraceHost,
};
use crate::patch::{
    patch_animated, patch_app_registry, patch_bridge, patch_event_emitter, patch_timer,
    patch_trace_hook, AppContextTable,
};
use perf_context::{ContextId, Profiler};
use perf_events::{IntervalReporter, TraceEventStack};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Identifies one patch in an [`AttachReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchKind {
    /// Low-level trace hook
    TraceHook,
    /// A timer module entry point
    Timer(TimerKind),
    /// The global-object property of a timer
    TimerGlobal(TimerKind),
    /// Native bridge enqueue
    NativeBridge,
    /// Event emitter subscription
    EventEmitter,
    /// Application registry register/run
    AppRegistry,
    /// Animation driver start
    Animated,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchKind::TraceHook => f.write_str("traceHook"),
            PatchKind::Timer(kind) => write!(f, "timers.{}", kind),
            PatchKind::TimerGlobal(kind) => write!(f, "global.{}", kind),
            PatchKind::NativeBridge => f.write_str("nativeBridge"),
            PatchKind::EventEmitter => f.write_str("eventEmitter"),
            PatchKind::AppRegistry => f.write_str("appRegistry"),
            PatchKind::Animated => f.write_str("animated"),
        }
    }
}

/// What a call to [`Installer::attach`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttachReport {
    /// `false` when instrumentation is disabled and nothing was touched
    pub enabled: bool,
    /// Patches that were installed
    pub applied: Vec<PatchKind>,
    /// Patches that were skipped, with the reason
    pub skipped: Vec<(PatchKind, PatchError)>,
}

impl AttachReport {
    /// Whether `kind` was installed.
    pub fn is_applied(&self, kind: PatchKind) -> bool {
        self.applied.contains(&kind)
    }

    /// Why `kind` was skipped, if it was.
    pub fn skipped_reason(&self, kind: PatchKind) -> Option<&PatchError> {
        self.skipped
            .iter()
            .find(|(skipped, _)| *skipped == kind)
            .map(|(_, err)| err)
    }

    /// Serialize the report to JSON for export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn record(&mut self, kind: PatchKind, result: PatchResult<()>) {
        match result {
            Ok(()) => self.applied.push(kind),
            Err(err) => {
                if !err.is_diagnostic() {
                    tracing::debug!(
                        target: "perf::instrument",
                        patch = %kind,
                        reason = %err,
                        "patch skipped"
                    );
                }
                self.skipped.push((kind, err));
            }
        }
    }
}

/// The collaborators available for instrumentation. Any may be absent.
#[derive(Default, Clone, Copy)]
pub struct Runtime<'a> {
    /// Timer module
    pub timers: Option<&'a dyn TimerHost>,
    /// Global object the timers are also published on
    pub globals: Option<&'a TimerGlobals>,
    /// Native message dispatcher
    pub bridge: Option<&'a dyn NativeBridge>,
    /// Event emitter
    pub emitter: Option<&'a dyn EventEmitterHost>,
    /// Application registry
    pub registry: Option<&'a dyn AppRegistryHost>,
    /// Animation driver
    pub animated: Option<&'a dyn AnimatedHost>,
    /// Low-level trace hook provider
    pub trace: Option<&'a dyn TraceHost>,
}

impl<'a> Runtime<'a> {
    /// A runtime with no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timer module.
    pub fn with_timers(mut self, timers: &'a dyn TimerHost) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Set the global object.
    pub fn with_globals(mut self, globals: &'a TimerGlobals) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Set the native bridge.
    pub fn with_bridge(mut self, bridge: &'a dyn NativeBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Set the event emitter.
    pub fn with_emitter(mut self, emitter: &'a dyn EventEmitterHost) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Set the application registry.
    pub fn with_registry(mut self, registry: &'a dyn AppRegistryHost) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the animation driver.
    pub fn with_animated(mut self, animated: &'a dyn AnimatedHost) -> Self {
        self.animated = Some(animated);
        self
    }

    /// Set the trace hook provider.
    pub fn with_trace(mut self, trace: &'a dyn TraceHost) -> Self {
        self.trace = Some(trace);
        self
    }
}

impl fmt::Debug for Runtime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("timers", &self.timers.is_some())
            .field("globals", &self.globals.is_some())
            .field("bridge", &self.bridge.is_some())
            .field("emitter", &self.emitter.is_some())
            .field("registry", &self.registry.is_some())
            .field("animated", &self.animated.is_some())
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

fn missing(patch: &str) -> PatchError {
    PatchError::MissingCollaborator {
        patch: patch.to_string(),
    }
}

/// Owns the state shared by the patches: the application-key side table
/// and the pending trace-interval stack.
pub struct Installer {
    reporter: IntervalReporter,
    app_contexts: Rc<AppContextTable>,
    trace_events: Rc<TraceEventStack>,
}

impl Installer {
    /// Create an installer reporting through `reporter`.
    pub fn new(reporter: IntervalReporter) -> Self {
        let prefix = reporter.profiler().config().trace_prefix.clone();
        let trace_events = Rc::new(TraceEventStack::new(Rc::clone(reporter.sink()), prefix));
        Self {
            reporter,
            app_contexts: Rc::new(AppContextTable::new()),
            trace_events,
        }
    }

    /// The profiler patches execute through.
    pub fn profiler(&self) -> &Profiler {
        self.reporter.profiler()
    }

    /// Contexts captured at application registration.
    pub fn app_contexts(&self) -> &AppContextTable {
        &self.app_contexts
    }

    /// In-flight trace intervals.
    pub fn trace_events(&self) -> &TraceEventStack {
        &self.trace_events
    }

    /// Install every patch the runtime has a collaborator for.
    ///
    /// Does nothing when instrumentation is disabled. Individual patch
    /// failures are recorded in the report and never abort the rest.
    /// Attaching twice wraps every entry point twice.
    pub fn attach(&self, runtime: &Runtime<'_>) -> AttachReport {
        let profiler = self.reporter.profiler();
        if !profiler.is_enabled() {
            tracing::debug!(target: "perf::instrument", "instrumentation disabled; attach skipped");
            return AttachReport::default();
        }

        let mut report = AttachReport {
            enabled: true,
            ..AttachReport::default()
        };

        report.record(
            PatchKind::TraceHook,
            runtime
                .trace
                .ok_or(PatchError::MissingTraceHook)
                .and_then(|host| patch_trace_hook(profiler, &self.trace_events, host)),
        );

        for kind in TimerKind::ALL {
            let patched = runtime
                .timers
                .ok_or_else(|| missing("timers"))
                .and_then(|host| patch_timer(&self.reporter, host, kind));
            match patched {
                Ok(patched) => {
                    report.record(PatchKind::Timer(kind), Ok(()));
                    if let Some(globals) = runtime.globals {
                        let installed = install_property(globals, kind.name(), patched);
                        report.record(PatchKind::TimerGlobal(kind), installed.map(|_| ()));
                    }
                }
                Err(err) => report.record(PatchKind::Timer(kind), Err(err)),
            }
        }

        report.record(
            PatchKind::NativeBridge,
            runtime
                .bridge
                .ok_or_else(|| missing("bridge"))
                .and_then(|host| patch_bridge(profiler, host)),
        );

        report.record(
            PatchKind::EventEmitter,
            runtime
                .emitter
                .ok_or_else(|| missing("emitter"))
                .map(|host| patch_event_emitter(profiler, host)),
        );

        report.record(
            PatchKind::AppRegistry,
            runtime
                .registry
                .ok_or_else(|| missing("registry"))
                .map(|host| patch_app_registry(profiler, &self.app_contexts, host)),
        );

        let untrackable = ContextId::new(profiler.config().untrackable_context.as_str());
        report.record(
            PatchKind::Animated,
            runtime
                .animated
                .ok_or_else(|| missing("animated"))
                .map(|host| patch_animated(profiler, untrackable, host)),
        );

        tracing::info!(
            target: "perf::instrument",
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "profiler attached"
        );
        report
    }
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("profiler", self.reporter.profiler())
            .field("app_contexts", &self.app_contexts)
            .field("trace_events", &self.trace_events)
            .finish()
    }
}
