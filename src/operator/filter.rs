//! Filtering operators: predicate- and position-based admission control.

use crate::channel::Channel;
use crate::error::StreamError;
use crate::model::{key_repr, Item, ItemKind};
use crate::operator::{forward_fault, spawn_operator};
use std::collections::HashSet;
use std::sync::Arc;

/// What `filter` admits.
///
/// The three accepted shapes are an explicit tagged variant rather than
/// runtime type inspection: a boolean predicate, a substring pattern matched
/// against the item's display rendering, or an item-kind discriminator.
#[derive(Clone)]
pub enum FilterCondition {
    /// Keep items for which the predicate returns `true`.
    Predicate(Arc<dyn Fn(&Item) -> Result<bool, String> + Send + Sync>),
    /// Keep items whose display rendering contains this pattern.
    Pattern(String),
    /// Keep items of exactly this kind.
    Kind(ItemKind),
}

impl FilterCondition {
    /// Build a predicate condition.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Item) -> Result<bool, String> + Send + Sync + 'static,
    {
        FilterCondition::Predicate(Arc::new(f))
    }

    fn admits(&self, item: &Item) -> Result<bool, String> {
        match self {
            FilterCondition::Predicate(f) => f(item),
            FilterCondition::Pattern(pattern) => Ok(item.to_string().contains(pattern.as_str())),
            FilterCondition::Kind(kind) => Ok(item.kind() == *kind),
        }
    }
}

impl From<&str> for FilterCondition {
    fn from(pattern: &str) -> Self {
        FilterCondition::Pattern(pattern.to_string())
    }
}

impl From<String> for FilterCondition {
    fn from(pattern: String) -> Self {
        FilterCondition::Pattern(pattern)
    }
}

impl From<ItemKind> for FilterCondition {
    fn from(kind: ItemKind) -> Self {
        FilterCondition::Kind(kind)
    }
}

impl Channel {
    /// Pass only items satisfying the condition, order preserved.
    pub fn filter(self, condition: impl Into<FilterCondition>) -> Channel {
        let condition = condition.into();
        spawn_operator("filter", move |out| async move {
            let mut upstream = self;
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        let keep = condition
                            .admits(&item)
                            .map_err(|msg| StreamError::at("filter", index, msg))?;
                        index += 1;
                        if keep && out.emit(item).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }

    /// Emit the first `n` items, then close the output immediately and detach
    /// from upstream without waiting for its closure. `take(0)` is an
    /// immediately-closed channel. The only operator allowed to detach early.
    pub fn take(self, n: usize) -> Channel {
        spawn_operator("take", move |out| async move {
            if n == 0 {
                return Ok(());
            }
            let mut upstream = self;
            let mut taken = 0usize;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        if out.emit(item).await.is_err() {
                            return Ok(());
                        }
                        taken += 1;
                        if taken == n {
                            // Dropping the upstream receiver here cancels the
                            // producer side.
                            return Ok(());
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }

    /// Discard the first `n` items and pass everything after, order
    /// preserved. Fewer than `n` upstream items yields an empty output.
    pub fn skip(self, n: usize) -> Channel {
        spawn_operator("skip", move |out| async move {
            let mut upstream = self;
            let mut skipped = 0usize;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        if skipped < n {
                            skipped += 1;
                            continue;
                        }
                        if out.emit(item).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }

    /// The first item only; `take(1)` shorthand.
    pub fn first(self) -> Channel {
        self.take(1)
    }

    /// Drop consecutive duplicate items.
    pub fn distinct(self) -> Channel {
        spawn_operator("distinct", move |out| async move {
            let mut upstream = self;
            let mut previous: Option<Item> = None;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        if previous.as_ref() == Some(&item) {
                            continue;
                        }
                        previous = Some(item.clone());
                        if out.emit(item).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }

    /// Drop every item that has already been emitted once, keeping first
    /// occurrences in arrival order. Unbounded memory on infinite streams.
    pub fn unique(self) -> Channel {
        spawn_operator("unique", move |out| async move {
            let mut upstream = self;
            let mut seen = HashSet::new();
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        if !seen.insert(key_repr(&item)) {
                            continue;
                        }
                        if out.emit(item).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }
}
