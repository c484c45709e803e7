//! Context identifiers and the stack of active frames

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a logical unit of work that elapsed time is attributed to.
///
/// An empty identifier is treated everywhere as "no context".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Create a context identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this identifier names no context.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ContextId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&ContextId> for ContextId {
    fn from(id: &ContextId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for ContextId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ContextId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContextId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One active executor invocation: the context it pushed and the label it
/// charges time to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Context made current by the invocation
    pub context: ContextId,
    /// Operation label the context's time is charged under
    pub label: String,
}

impl Frame {
    /// Create a frame.
    pub fn new(context: ContextId, label: impl Into<String>) -> Self {
        Self {
            context,
            label: label.into(),
        }
    }
}

/// LIFO stack of active frames. The top frame is the current context.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame, making its context current.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the current frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// The current (innermost) frame.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// The current context, if any.
    pub fn current(&self) -> Option<&ContextId> {
        self.top().map(|frame| &frame.context)
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if no context is active.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Contexts from outermost to innermost.
    pub fn contexts(&self) -> impl Iterator<Item = &ContextId> {
        self.frames.iter().map(|frame| &frame.context)
    }

    /// The context chain rendered as `outer->inner`.
    pub fn chain(&self) -> String {
        self.contexts()
            .map(ContextId::as_str)
            .collect::<Vec<_>>()
            .join("->")
    }
}
