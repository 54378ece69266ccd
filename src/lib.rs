//! # rillflow
//!
//! In-process dataflow engine: named channels carry ordered sequences of
//! dynamic items between declarative operators.
//!
//! Pipelines are composed by chaining operator methods on [`Channel`]; each
//! operator runs in its own tokio task and owns the output channel it
//! creates. Finite and never-closing streams are both supported; only `mix`
//! relaxes ordering, only `take` detaches from upstream early, and every
//! fault is fatal to the whole graph.
//!
//! ```rust,no_run
//! use rillflow::{Channel, Item};
//!
//! # async fn demo() -> Result<(), rillflow::FlowError> {
//! let doubled = Channel::of([1, 2, 3])
//!     .map(|item| match item {
//!         Item::Int(v) => Ok(Item::Int(v * 2)),
//!         other => Err(format!("expected int, got {}", other.kind())),
//!     })
//!     .gather()
//!     .await?;
//! assert_eq!(doubled, vec![Item::Int(2), Item::Int(4), Item::Int(6)]);
//! # Ok(())
//! # }
//! ```
//!
//! Resource caveat: the keyed combinators (`combine`, `join`, `cross`) buffer
//! their entire right side before emitting, so they require at least one
//! finite side and grow per-key buffers without bound on unbounded inputs.

pub mod channel;
pub mod error;
pub mod model;
pub mod operator;
pub mod sink;
pub mod source;
pub mod splitter;

pub use channel::{Channel, Emitter, Message};
pub use error::{ChannelClosed, FlowError, StreamError};
pub use model::{Item, ItemKind, KeySelector};
pub use operator::{BufferPolicy, FilterCondition};
pub use sink::WriteMode;
pub use source::{LinesSource, Source};
pub use splitter::{FastaRecordSpec, SplitCsvOptions, SplitFastaOptions, SplitFastqOptions};
