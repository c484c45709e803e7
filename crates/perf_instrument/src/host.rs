//! Capability interfaces of the instrumented runtime
//!
//! Each collaborator exposes its async-registration entry points as
//! [`EntryPoint`]s. Instrumentation only ever decorates those entry points;
//! what the collaborator does behind them is its own business. A test
//! harness implements these traits with fakes.

use crate::entry::EntryPoint;
use crate::global::GlobalScope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Timers
// =============================================================================

/// The timer-scheduling family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// One-shot delayed callback
    Timeout,
    /// Repeating callback
    Interval,
    /// Callback at the end of the current turn
    Immediate,
    /// Callback before the next frame
    AnimationFrame,
    /// Callback when the loop is idle
    IdleCallback,
}

impl TimerKind {
    /// Every timer kind, in patch order.
    pub const ALL: [TimerKind; 5] = [
        TimerKind::Timeout,
        TimerKind::Interval,
        TimerKind::Immediate,
        TimerKind::AnimationFrame,
        TimerKind::IdleCallback,
    ];

    /// Entry point name, also used as the timing label.
    pub fn name(self) -> &'static str {
        match self {
            TimerKind::Timeout => "setTimeout",
            TimerKind::Interval => "setInterval",
            TimerKind::Immediate => "setImmediate",
            TimerKind::AnimationFrame => "requestAnimationFrame",
            TimerKind::IdleCallback => "requestIdleCallback",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by a timer entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Callback fired by a timer; repeating timers fire it more than once.
pub type TimerCallback = Box<dyn FnMut()>;

/// `(callback, delay_ms) -> handle`.
pub type ScheduleFn = dyn Fn(TimerCallback, f64) -> TimerId;

/// The runtime global object's timer properties.
pub type TimerGlobals = GlobalScope<Rc<ScheduleFn>>;

/// Timer module exposing one entry point per supported [`TimerKind`].
pub trait TimerHost {
    /// Entry point for `kind`, if the runtime supports it.
    fn timer(&self, kind: TimerKind) -> Option<&EntryPoint<ScheduleFn>>;
}

// =============================================================================
// Native bridge
// =============================================================================

/// A call queued for the native side.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    /// Numeric id of the target module
    pub module_id: u32,
    /// Numeric id of the method within the module
    pub method_id: u32,
    /// Call arguments
    pub args: Vec<Value>,
}

impl NativeCall {
    /// Create a call.
    pub fn new(module_id: u32, method_id: u32, args: Vec<Value>) -> Self {
        Self {
            module_id,
            method_id,
            args,
        }
    }
}

/// Success or failure completion of a native call.
pub type BridgeCallback = Box<dyn FnOnce(Value)>;

/// `(call, on_success, on_failure)`.
pub type EnqueueFn = dyn Fn(NativeCall, Option<BridgeCallback>, Option<BridgeCallback>);

/// Lookup from numeric ids to module and method names.
#[derive(Debug, Default)]
pub struct RemoteTables {
    modules: RefCell<HashMap<u32, RemoteModule>>,
}

#[derive(Debug, Clone)]
struct RemoteModule {
    name: String,
    methods: Vec<String>,
}

impl RemoteTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; method ids index into `methods`.
    pub fn register_module(&self, module_id: u32, name: impl Into<String>, methods: &[&str]) {
        self.modules.borrow_mut().insert(
            module_id,
            RemoteModule {
                name: name.into(),
                methods: methods.iter().map(|m| m.to_string()).collect(),
            },
        );
    }

    /// Name of a module.
    pub fn module_name(&self, module_id: u32) -> Option<String> {
        self.modules
            .borrow()
            .get(&module_id)
            .map(|module| module.name.clone())
    }

    /// Name of a method.
    pub fn method_name(&self, module_id: u32, method_id: u32) -> Option<String> {
        self.modules
            .borrow()
            .get(&module_id)?
            .methods
            .get(method_id as usize)
            .cloned()
    }

    /// `"<module>.<method>"`, falling back to numeric ids for unknown parts.
    pub fn label(&self, module_id: u32, method_id: u32) -> String {
        let module = self
            .module_name(module_id)
            .unwrap_or_else(|| module_id.to_string());
        let method = self
            .method_name(module_id, method_id)
            .unwrap_or_else(|| method_id.to_string());
        format!("{}.{}", module, method)
    }
}

/// Message dispatcher to the native side.
pub trait NativeBridge {
    /// The enqueue entry point.
    fn enqueue_native_call(&self) -> &EntryPoint<EnqueueFn>;

    /// Id-to-name tables, if the bridge keeps them.
    fn remote_tables(&self) -> Option<Rc<RemoteTables>>;
}

// =============================================================================
// Event emitter
// =============================================================================

/// Listener invoked with the emitted payload.
pub type Listener = Rc<dyn Fn(&Value)>;

/// Handle returned by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// `(event_type, listener) -> subscription`.
pub type AddListenerFn = dyn Fn(&str, Listener) -> SubscriptionId;

/// Subscribable event source.
pub trait EventEmitterHost {
    /// The subscribe entry point.
    fn add_listener(&self) -> &EntryPoint<AddListenerFn>;
}

// =============================================================================
// Application registry
// =============================================================================

/// Application body run with its initial parameters.
pub type AppRunnable = Rc<dyn Fn(&Value)>;

/// `(app_key, runnable)`.
pub type RegisterFn = dyn Fn(&str, AppRunnable);

/// `(app_key, params)`.
pub type RunFn = dyn Fn(&str, &Value);

/// Named application registry.
pub trait AppRegistryHost {
    /// Registers a component-backed application.
    fn register_component(&self) -> &EntryPoint<RegisterFn>;

    /// Registers a plain runnable.
    fn register_runnable(&self) -> &EntryPoint<RegisterFn>;

    /// Runs a registered application by key.
    fn run_application(&self) -> &EntryPoint<RunFn>;
}

// =============================================================================
// Animation driver
// =============================================================================

/// Request to start animating a node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStart {
    /// Animated node
    pub node_tag: u64,
    /// Animation instance
    pub animation_id: u64,
    /// Driver-specific configuration
    pub config: Value,
}

/// Outcome passed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEnd {
    /// `false` when the animation was interrupted
    pub finished: bool,
}

/// Completion callback of an animation.
pub type AnimationEndCallback = Box<dyn FnOnce(AnimationEnd)>;

/// `(start, on_complete)`.
pub type StartAnimationFn = dyn Fn(AnimationStart, Option<AnimationEndCallback>);

/// Native animation driver.
pub trait AnimatedHost {
    /// The start entry point.
    fn start_animating_node(&self) -> &EntryPoint<StartAnimationFn>;
}

// =============================================================================
// Trace hook
// =============================================================================

/// `begin(message)`.
pub type TraceBeginFn = dyn Fn(Option<&str>);

/// `end()`.
pub type TraceEndFn = dyn Fn();

/// Paired begin/end hook the runtime calls around low-level work such as
/// module loading.
#[derive(Debug)]
pub struct TraceHook {
    /// Called when a traced section starts
    pub begin: EntryPoint<TraceBeginFn>,
    /// Called when the innermost traced section ends
    pub end: EntryPoint<TraceEndFn>,
}

impl TraceHook {
    /// A hook whose begin and end do nothing until instrumented.
    pub fn new() -> Self {
        let begin: Rc<TraceBeginFn> = Rc::new(|_message: Option<&str>| {});
        let end: Rc<TraceEndFn> = Rc::new(|| {});
        Self {
            begin: EntryPoint::new("beginEvent", begin),
            end: EntryPoint::new("endEvent", end),
        }
    }

    /// Report a section start through whatever is installed.
    pub fn begin_event(&self, message: Option<&str>) {
        self.begin.get()(message);
    }

    /// Report a section end through whatever is installed.
    pub fn end_event(&self) {
        self.end.get()();
    }
}

impl Default for TraceHook {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime that may expose a low-level trace hook.
pub trait TraceHost {
    /// The hook, if the runtime has one.
    fn trace_hook(&self) -> Option<&TraceHook>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timer_names() {
        let names: Vec<&str> = TimerKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec![
                "setTimeout",
                "setInterval",
                "setImmediate",
                "requestAnimationFrame",
                "requestIdleCallback"
            ]
        );
        assert_eq!(TimerKind::Interval.to_string(), "setInterval");
    }

    #[test]
    fn test_remote_tables_label() {
        let tables = RemoteTables::new();
        tables.register_module(0, "moduleName", &["methodName", "other"]);

        assert_eq!(tables.label(0, 0), "moduleName.methodName");
        assert_eq!(tables.label(0, 1), "moduleName.other");
        assert_eq!(tables.label(0, 7), "moduleName.7");
        assert_eq!(tables.label(3, 1), "3.1");
    }

    #[test]
    fn test_trace_hook_calls_installed_functions() {
        let hook = TraceHook::new();
        let begins = Rc::new(Cell::new(0));
        let counter = Rc::clone(&begins);
        let begin: Rc<TraceBeginFn> = Rc::new(move |_message: Option<&str>| {
            counter.set(counter.get() + 1)
        });
        hook.begin.replace(begin);

        hook.begin_event(Some("x"));
        hook.begin_event(None);
        hook.end_event();
        assert_eq!(begins.get(), 2);
    }
}
