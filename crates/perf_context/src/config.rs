//! Profiler configuration

use crate::error::ProfilerResult;
use serde::{Deserialize, Serialize};

/// Scope used by interval reporting when the caller names none.
pub const DEFAULT_SCOPE: &str = "General";

/// Trace messages starting with this prefix are reported to the sink.
pub const DEFAULT_TRACE_PREFIX: &str = "JS_require_";

/// Context assigned to animations started outside any context.
pub const DEFAULT_UNTRACKABLE_CONTEXT: &str = "untrackableAnimation";

/// Configuration injected into the profiler at construction.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use perf_context::ProfilerConfig;
///
/// let config = ProfilerConfig::from_json(r#"{"enabled": true}"#).unwrap();
/// assert!(config.enabled);
/// assert_eq!(config.default_scope, "General");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilerConfig {
    /// Full instrumentation and sink reporting when `true`, pass-through
    /// only when `false`. Defaults to on in debug builds.
    pub enabled: bool,
    /// Scope for `time_and_log` when none is given
    pub default_scope: String,
    /// Prefix selecting reportable low-level trace messages
    pub trace_prefix: String,
    /// Sentinel context for animations started with no active context
    pub untrackable_context: String,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            default_scope: DEFAULT_SCOPE.to_string(),
            trace_prefix: DEFAULT_TRACE_PREFIX.to_string(),
            untrackable_context: DEFAULT_UNTRACKABLE_CONTEXT.to_string(),
        }
    }
}

impl ProfilerConfig {
    /// Configuration with instrumentation switched on.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Configuration with instrumentation switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> ProfilerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder method to toggle instrumentation.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method to set the default interval scope.
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = scope.into();
        self
    }

    /// Builder method to set the reportable trace prefix.
    pub fn with_trace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trace_prefix = prefix.into();
        self
    }

    /// Builder method to set the untrackable animation context.
    pub fn with_untrackable_context(mut self, context: impl Into<String>) -> Self {
        self.untrackable_context = context.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfilerError;

    #[test]
    fn test_default_follows_build_mode() {
        let config = ProfilerConfig::default();
        assert_eq!(config.enabled, cfg!(debug_assertions));
        assert_eq!(config.trace_prefix, "JS_require_");
        assert_eq!(config.untrackable_context, "untrackableAnimation");
    }

    #[test]
    fn test_partial_json() {
        let config = ProfilerConfig::from_json(
            r#"{"enabled": false, "defaultScope": "App", "tracePrefix": "JS_"}"#,
        )
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.default_scope, "App");
        assert_eq!(config.trace_prefix, "JS_");
        assert_eq!(config.untrackable_context, DEFAULT_UNTRACKABLE_CONTEXT);
    }

    #[test]
    fn test_invalid_json() {
        let err = ProfilerConfig::from_json("{enabled").unwrap_err();
        assert!(matches!(err, ProfilerError::Config(_)));
    }

    #[test]
    fn test_builders() {
        let config = ProfilerConfig::disabled()
            .with_enabled(true)
            .with_default_scope("Boot")
            .with_untrackable_context("orphan");
        assert!(config.enabled);
        assert_eq!(config.default_scope, "Boot");
        assert_eq!(config.untrackable_context, "orphan");
    }
}
