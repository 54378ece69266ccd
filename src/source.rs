//! External producers feeding channels.
//!
//! A source is anything that can emit items into a channel and close it: a
//! literal collection (see [`Channel::of`]), a file listing, or the completion
//! handle of an external process. The runtime never interprets what the items
//! mean; it only moves them.

use crate::channel::{Channel, Emitter};
use crate::error::StreamError;
use async_trait::async_trait;
use std::path::PathBuf;

/// An external producer bound to a channel.
///
/// The source owns the producer loop: emit items, then return to close the
/// channel. A returned error is injected as a pipeline-terminating fault.
#[async_trait]
pub trait Source: Send + 'static {
    /// Identifier used in fault reports and logs.
    fn name(&self) -> &str;

    /// Produce items into the channel until done or failed.
    async fn run(self: Box<Self>, emitter: Emitter) -> Result<(), StreamError>;
}

impl Channel {
    /// Spawn `source` as a producer task and return the channel it feeds.
    pub fn from_source(source: impl Source) -> Channel {
        let (tx, output) = Channel::unbounded();
        let source = Box::new(source);
        tokio::spawn(async move {
            let name = source.name().to_string();
            if let Err(error) = source.run(tx.clone()).await {
                tracing::error!(source = %name, %error, "source fault");
                let _ = tx.fault(error).await;
            }
        });
        output
    }
}

/// Source emitting each line of a file as one `Str` item.
pub struct LinesSource {
    path: PathBuf,
}

impl LinesSource {
    /// Read lines from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Source for LinesSource {
    fn name(&self) -> &str {
        "lines_source"
    }

    async fn run(self: Box<Self>, emitter: Emitter) -> Result<(), StreamError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            StreamError::new(
                "lines_source",
                format!("failed to read {}: {err}", self.path.display()),
            )
        })?;
        for line in content.lines() {
            if emitter.emit(line).await.is_err() {
                // Consumer detached, stop producing.
                return Ok(());
            }
        }
        Ok(())
    }
}
