//! Operator runtime: every operator runs in its own tokio task, reading one or
//! more upstream channels and feeding exactly one fresh output channel.
//!
//! The shared contract, honored by every file in this module:
//! - items flow downstream in the order each operator defines (only `mix`
//!   interleaves nondeterministically);
//! - an upstream fault is forwarded downstream once and stops the operator;
//! - a failing user closure becomes a fault tagged with the operator name and
//!   the offending item index;
//! - a dropped downstream consumer stops the operator quietly.

pub mod combine;
pub mod filter;
pub mod group;
pub mod transform;

pub use filter::FilterCondition;
pub use group::BufferPolicy;

use crate::channel::{Channel, Emitter};
use crate::error::StreamError;
use std::future::Future;

/// Wire operator logic to a fresh output channel.
///
/// Spawns the body as a tokio task, hands it the output emitter, and converts
/// a returned error into an in-band fault. The output channel closes when the
/// body returns and the emitter is dropped.
pub(crate) fn spawn_operator<F, Fut>(name: &'static str, body: F) -> Channel
where
    F: FnOnce(Emitter) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), StreamError>> + Send + 'static,
{
    let (tx, output) = Channel::unbounded();
    tokio::spawn(async move {
        if let Err(error) = body(tx.clone()).await {
            tracing::error!(operator = name, %error, "operator fault");
            let _ = tx.fault(error).await;
        }
    });
    output
}

/// Forward an upstream fault downstream. The operator stops afterwards, so a
/// dropped downstream is only worth a debug line.
pub(crate) async fn forward_fault(out: &Emitter, error: StreamError) {
    if out.fault(error).await.is_err() {
        tracing::debug!("downstream dropped before fault could be forwarded");
    }
}
