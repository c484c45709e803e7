//! In-memory sink that keeps every notification it receives.

use crate::sink::{EventSink, EventStatus, IntervalEvent};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A single notification received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SinkRecord {
    /// An interval record was created
    Created {
        /// Record identifier, unique per sink
        id: u64,
        /// Scope the record was tagged with
        scope: String,
        /// Name the record was tagged with
        name: String,
    },
    /// An interval was opened
    Began {
        /// Record identifier
        id: u64,
        /// Description passed when opening
        description: String,
    },
    /// An interval was closed
    Ended {
        /// Record identifier
        id: u64,
        /// Completion status
        status: EventStatus,
    },
}

/// Sink that records notifications for later inspection or export.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Rc<RefCell<Vec<SinkRecord>>>,
    next_id: Rc<Cell<u64>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.borrow().clone()
    }

    /// `(scope, name)` of every created record.
    pub fn created(&self) -> Vec<(String, String)> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Created { scope, name, .. } => Some((scope.clone(), name.clone())),
                _ => None,
            })
            .collect()
    }

    /// Descriptions of every opened interval.
    pub fn began(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Began { description, .. } => Some(description.clone()),
                _ => None,
            })
            .collect()
    }

    /// Statuses of every closed interval.
    pub fn ended(&self) -> Vec<EventStatus> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Ended { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }

    /// Forget everything received so far.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    /// Export the log as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.records.borrow())
    }

    fn push(&self, record: SinkRecord) {
        self.records.borrow_mut().push(record);
    }
}

struct RecordedEvent {
    id: u64,
    sink: RecordingSink,
}

impl IntervalEvent for RecordedEvent {
    fn begin_interval(&mut self, description: &str) {
        self.sink.push(SinkRecord::Began {
            id: self.id,
            description: description.to_string(),
        });
    }

    fn end_interval(&mut self, status: EventStatus) {
        self.sink.push(SinkRecord::Ended {
            id: self.id,
            status,
        });
    }
}

impl EventSink for RecordingSink {
    fn create_event(&self, scope: &str, name: &str) -> Box<dyn IntervalEvent> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.push(SinkRecord::Created {
            id,
            scope: scope.to_string(),
            name: name.to_string(),
        });
        Box::new(RecordedEvent {
            id,
            sink: self.clone(),
        })
    }
}
