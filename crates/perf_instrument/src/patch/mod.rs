//! One patch per collaborator entry point.
//!
//! Every patch captures the current context when a callback is
//! registered and re-enters it when the collaborator later invokes the
//! callback. Patches are independent: re-applying one wraps the already
//! wrapped entry point again.

mod animation;
mod bridge;
mod emitter;
mod registry;
mod timers;
mod trace;

pub use animation::ANIMATION_LABEL;
pub use emitter::EMITTER_LABEL;
pub use registry::{AppContextTable, RUN_LABEL};
pub use timers::TIMER_SCOPE;

pub(crate) use animation::patch_animated;
pub(crate) use bridge::patch_bridge;
pub(crate) use emitter::patch_event_emitter;
pub(crate) use registry::patch_app_registry;
pub(crate) use timers::patch_timer;
pub(crate) use trace::patch_trace_hook;
