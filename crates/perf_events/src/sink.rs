//! External event sink abstraction.

use serde::{Deserialize, Serialize};

/// How an interval ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    /// The bracketed work returned normally
    Completed,
    /// The bracketed work unwound before returning
    Failed,
}

/// One interval record created by an [`EventSink`].
pub trait IntervalEvent {
    /// Open the interval.
    fn begin_interval(&mut self, description: &str);

    /// Close the interval.
    fn end_interval(&mut self, status: EventStatus);
}

/// Receiver of begin/end interval notifications, e.g. a profiling UI.
pub trait EventSink {
    /// Create an interval record tagged with `scope` and `name`.
    fn create_event(&self, scope: &str, name: &str) -> Box<dyn IntervalEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EventStatus::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: EventStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, EventStatus::Failed);
    }
}
