//! Error types shared across the dataflow runtime.
//!
//! Faults travel in-band on channels as [`StreamError`] so that every operator
//! between the failure point and the terminal sink sees them exactly once.
//! Terminal surfaces (`gather`, aggregates, file sinks) convert them into
//! [`FlowError`].

/// In-band pipeline fault.
///
/// Carries the originating operator plus, where feasible, the index of the
/// offending item. Cloneable because a fault may be fanned out to multiple
/// downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operator}: {message}")]
pub struct StreamError {
    /// Name of the operator (or source) where the fault originated.
    pub operator: String,
    /// Zero-based index of the offending item, when known.
    pub index: Option<u64>,
    /// Human-readable failure description.
    pub message: String,
}

impl StreamError {
    /// Build a fault without item position information.
    pub fn new(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            index: None,
            message: message.into(),
        }
    }

    /// Build a fault pinned to a specific upstream item index.
    pub fn at(operator: impl Into<String>, index: u64, message: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            index: Some(index),
            message: message.into(),
        }
    }
}

/// Errors surfaced by terminal operations (aggregates, sinks, `gather`).
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A fault propagated through the channel graph.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// An aggregate that requires at least one item ran on an empty channel.
    #[error("aggregation over empty channel")]
    EmptyAggregation,
    /// Items of incompatible kinds reached a comparison or numeric aggregate.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// An integer aggregate left the representable `i64` range.
    #[error("numeric overflow: {0}")]
    Overflow(String),
    /// File sink I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization failure in the JSON sink.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returned by [`crate::channel::Emitter`] when every consumer has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel closed: all consumers dropped")]
pub struct ChannelClosed;
