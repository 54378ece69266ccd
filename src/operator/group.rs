//! Grouping and batching operators: stateful accumulation with
//! completion-triggered flush.

use crate::channel::Channel;
use crate::error::StreamError;
use crate::model::{key_repr, Item, KeySelector};
use crate::operator::{forward_fault, spawn_operator};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

type BoundaryFn = Arc<dyn Fn(&Item) -> Result<bool, String> + Send + Sync>;

/// When `buffer` closes the pending group and emits it.
#[derive(Clone)]
pub enum BufferPolicy {
    /// Emit once the group holds this many items.
    Size(usize),
    /// Emit when an item satisfies the boundary predicate; the boundary item
    /// is included in the emitted group.
    Boundary(BoundaryFn),
    /// Emit on whichever of the two triggers fires first.
    SizeOrBoundary(usize, BoundaryFn),
}

impl BufferPolicy {
    /// Size-triggered batching.
    pub fn size(n: usize) -> Self {
        BufferPolicy::Size(n)
    }

    /// Boundary-item-triggered batching.
    pub fn boundary<F>(f: F) -> Self
    where
        F: Fn(&Item) -> Result<bool, String> + Send + Sync + 'static,
    {
        BufferPolicy::Boundary(Arc::new(f))
    }

    /// Combined trigger: size limit or boundary item, whichever comes first.
    pub fn size_or_boundary<F>(n: usize, f: F) -> Self
    where
        F: Fn(&Item) -> Result<bool, String> + Send + Sync + 'static,
    {
        BufferPolicy::SizeOrBoundary(n, Arc::new(f))
    }

    /// Whether the group should be flushed after `item` was appended to a
    /// group now holding `len` items.
    fn should_flush(&self, item: &Item, len: usize) -> Result<bool, String> {
        match self {
            BufferPolicy::Size(n) => Ok(len >= *n),
            BufferPolicy::Boundary(f) => f(item),
            BufferPolicy::SizeOrBoundary(n, f) => Ok(len >= *n || f(item)?),
        }
    }
}

impl From<usize> for BufferPolicy {
    fn from(n: usize) -> Self {
        BufferPolicy::Size(n)
    }
}

impl Channel {
    /// Accumulate items into groups and emit each group as one `List` item.
    ///
    /// A group is emitted when the policy triggers; on upstream closure any
    /// non-empty partial group is emitted as a final short batch.
    pub fn buffer(self, policy: impl Into<BufferPolicy>) -> Channel {
        let policy = policy.into();
        spawn_operator("buffer", move |out| async move {
            let mut upstream = self;
            let mut pending: Vec<Item> = Vec::new();
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        pending.push(item);
                        let flush = policy
                            .should_flush(&pending[pending.len() - 1], pending.len())
                            .map_err(|msg| StreamError::at("buffer", index, msg))?;
                        index += 1;
                        if flush {
                            let group = Item::List(std::mem::take(&mut pending));
                            if out.emit(group).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            if !pending.is_empty() {
                let _ = out.emit(Item::List(pending)).await;
            }
            Ok(())
        })
    }

    /// Emit sliding/stepping fixed-size windows: window *k* starts at
    /// upstream index `k*step` and holds `size` consecutive items. `step <
    /// size` overlaps windows, `step > size` skips items between windows.
    ///
    /// Windows still open when upstream closes are emitted (shorter than
    /// `size`) only when `keep_remainder` is set.
    pub fn collate(self, size: usize, step: usize, keep_remainder: bool) -> Channel {
        spawn_operator("collate", move |out| async move {
            if size == 0 || step == 0 {
                return Err(StreamError::new(
                    "collate",
                    format!("size and step must be positive, got size={size} step={step}"),
                ));
            }

            let mut upstream = self;
            // Earlier windows started earlier and therefore fill first, so
            // completed windows always sit at the front.
            let mut open: VecDeque<Vec<Item>> = VecDeque::new();
            let mut index: usize = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        if index % step == 0 {
                            open.push_back(Vec::with_capacity(size));
                        }
                        for window in open.iter_mut() {
                            window.push(item.clone());
                        }
                        index += 1;
                        while open.front().is_some_and(|window| window.len() == size) {
                            let window = open.pop_front().unwrap_or_default();
                            if out.emit(Item::List(window)).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            if keep_remainder {
                for window in open {
                    if window.is_empty() {
                        continue;
                    }
                    if out.emit(Item::List(window)).await.is_err() {
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }

    /// Group the entire upstream by key and emit one `[key, [items…]]` tuple
    /// per distinct key, exactly once.
    ///
    /// Requires upstream closure before any group is finalized (a late item
    /// for an already-emitted key must not occur). Groups are emitted in
    /// first-occurrence order of their key; items within a group keep arrival
    /// order.
    pub fn group_tuple(self, by: impl Into<KeySelector>) -> Channel {
        let by = by.into();
        spawn_operator("group_tuple", move |out| async move {
            let mut upstream = self;
            let mut order: Vec<String> = Vec::new();
            let mut groups: HashMap<String, (Item, Vec<Item>)> = HashMap::new();
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        let key = by
                            .key_of(&item)
                            .map_err(|msg| StreamError::at("group_tuple", index, msg))?;
                        index += 1;
                        let repr = key_repr(&key);
                        match groups.get_mut(&repr) {
                            Some((_, members)) => members.push(item),
                            None => {
                                order.push(repr.clone());
                                groups.insert(repr, (key, vec![item]));
                            }
                        }
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            for repr in order {
                if let Some((key, members)) = groups.remove(&repr) {
                    let group = Item::Tuple(vec![key, Item::List(members)]);
                    if out.emit(group).await.is_err() {
                        return Ok(());
                    }
                }
            }
            Ok(())
        })
    }
}
