//! Error types for instrumentation patches.

use serde::Serialize;
use thiserror::Error;

/// Reasons a single patch could not be applied.
///
/// None of these abort [`attach`](crate::Installer::attach); the patch is
/// skipped and the rest of the instrumentation keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum PatchError {
    /// The target property exists and cannot be redefined
    #[error("Failed to attach profiler. {property} is not configurable.")]
    NotConfigurable {
        /// Name of the refused property
        property: String,
    },

    /// The runtime did not provide this collaborator
    #[error("No {patch} collaborator available")]
    MissingCollaborator {
        /// Patch that was skipped
        patch: String,
    },

    /// The native bridge has no module/method name tables to label calls
    #[error("Native bridge exposes no module/method lookup tables")]
    MissingLookupTables,

    /// The runtime exposes no low-level trace hook
    #[error("Runtime exposes no trace hook")]
    MissingTraceHook,
}

impl PatchError {
    /// Whether this skip deserves a diagnostic rather than silence.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, PatchError::NotConfigurable { .. })
    }
}

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;
