//! The channel primitive: a concurrently-producible, single-consumer stream
//! with an explicit completion signal.
//!
//! A channel is a queue of [`Message`]s between one producer side (an
//! [`Emitter`], cloneable for concurrent producers) and one consumer side (the
//! [`Channel`] handle itself). Closing is signalled by dropping every emitter
//! clone; the consumer then drains whatever is pending and terminates. Faults
//! travel in-band so downstream operators observe them in arrival order.

use crate::error::{ChannelClosed, FlowError, StreamError};
use crate::model::Item;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};

/// What actually travels on a channel: an item, or a pipeline-terminating
/// fault.
pub type Message = Result<Item, StreamError>;

enum TxKind {
    Bounded(mpsc::Sender<Message>),
    Unbounded(mpsc::UnboundedSender<Message>),
}

impl Clone for TxKind {
    fn clone(&self) -> Self {
        match self {
            TxKind::Bounded(tx) => TxKind::Bounded(tx.clone()),
            TxKind::Unbounded(tx) => TxKind::Unbounded(tx.clone()),
        }
    }
}

/// Producer half of a channel.
///
/// Clone it to feed the same channel from multiple concurrent producers. The
/// channel closes once every clone has been dropped.
#[derive(Clone)]
pub struct Emitter {
    tx: TxKind,
}

impl Emitter {
    /// Append an item to the channel, waking a waiting consumer.
    ///
    /// Suspends only on a bounded channel at capacity. Returns
    /// [`ChannelClosed`] once the consumer side has been dropped, which
    /// producers treat as a quiet stop signal rather than an error.
    pub async fn emit(&self, item: impl Into<Item>) -> Result<(), ChannelClosed> {
        self.send(Ok(item.into())).await
    }

    /// Inject a pipeline-terminating fault into the channel.
    pub async fn fault(&self, error: StreamError) -> Result<(), ChannelClosed> {
        self.send(Err(error)).await
    }

    async fn send(&self, message: Message) -> Result<(), ChannelClosed> {
        match &self.tx {
            TxKind::Bounded(tx) => tx.send(message).await.map_err(|_| ChannelClosed),
            TxKind::Unbounded(tx) => tx.send(message).map_err(|_| ChannelClosed),
        }
    }
}

enum RxKind {
    Bounded(mpsc::Receiver<Message>),
    Unbounded(mpsc::UnboundedReceiver<Message>),
}

/// Consumer half of a channel, and the handle operators chain on.
///
/// Every operator method consumes the channel (upstream channels are owned by
/// exactly one downstream operator) and produces a fresh output channel, except
/// terminal sinks which resolve to a value.
pub struct Channel {
    rx: RxKind,
}

impl Channel {
    /// Create an unbounded channel. This is the default policy: producers
    /// never suspend, batch operators buffer freely.
    pub fn unbounded() -> (Emitter, Channel) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Emitter {
                tx: TxKind::Unbounded(tx),
            },
            Channel {
                rx: RxKind::Unbounded(rx),
            },
        )
    }

    /// Create a bounded channel whose producers suspend at `capacity` pending
    /// items.
    pub fn bounded(capacity: usize) -> (Emitter, Channel) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Emitter {
                tx: TxKind::Bounded(tx),
            },
            Channel {
                rx: RxKind::Bounded(rx),
            },
        )
    }

    /// Build an eagerly-closed value channel from a literal collection.
    ///
    /// All items are queued at creation and the channel is already closed, so
    /// it can be built outside a runtime.
    pub fn of<I, T>(items: I) -> Channel
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        for item in items {
            // Receiver is held locally, the send cannot fail.
            let _ = tx.send(Ok(item.into()));
        }
        drop(tx);
        Channel {
            rx: RxKind::Unbounded(rx),
        }
    }

    /// A channel that is closed at creation and yields nothing.
    pub fn empty() -> Channel {
        Channel::of(Vec::<Item>::new())
    }

    /// Receive the next message, suspending while the channel is open but
    /// empty. Returns `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        match &mut self.rx {
            RxKind::Bounded(rx) => rx.recv().await,
            RxKind::Unbounded(rx) => rx.recv().await,
        }
    }

    /// View this channel as a message stream (used by `mix` for fan-in).
    pub fn into_stream(self) -> BoxStream<'static, Message> {
        match self.rx {
            RxKind::Bounded(rx) => ReceiverStream::new(rx).boxed(),
            RxKind::Unbounded(rx) => UnboundedReceiverStream::new(rx).boxed(),
        }
    }

    /// Terminal drain: collect every remaining item in arrival order.
    ///
    /// The first in-band fault aborts the drain and becomes the error. This
    /// cannot resolve on a channel that never closes.
    pub async fn gather(mut self) -> Result<Vec<Item>, FlowError> {
        let mut items = Vec::new();
        while let Some(message) = self.recv().await {
            items.push(message?);
        }
        Ok(items)
    }

    /// Fan this channel out to `n` independent consumers.
    ///
    /// Every message is cloned to each downstream channel in order, so all
    /// consumers observe the same sequence. Closure and faults propagate to
    /// every branch.
    pub fn fork(mut self, n: usize) -> Vec<Channel> {
        let mut emitters = Vec::with_capacity(n);
        let mut outputs = Vec::with_capacity(n);
        for _ in 0..n {
            let (tx, rx) = Channel::unbounded();
            emitters.push(tx);
            outputs.push(rx);
        }

        tokio::spawn(async move {
            while let Some(message) = self.recv().await {
                let mut delivered = false;
                for emitter in &emitters {
                    if emitter.send(message.clone()).await.is_ok() {
                        delivered = true;
                    }
                }
                if !delivered {
                    // Every branch dropped, stop pulling from upstream.
                    break;
                }
            }
        });

        outputs
    }
}
