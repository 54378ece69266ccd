//! Multi-channel combining operators.
//!
//! The keyed operators (`combine`, `join`) and `cross` buffer their entire
//! right side before emitting anything for any key, so they require the right
//! channel to close. A never-closing right side means the operator never
//! completes, and per-key buffers grow without bound on unbounded inputs.
//! That is the documented resource caveat, not an error condition.

use crate::channel::Channel;
use crate::error::StreamError;
use crate::model::{key_repr, Item, KeySelector};
use crate::operator::{forward_fault, spawn_operator};
use futures::stream::SelectAll;
use futures::StreamExt;
use std::collections::HashMap;

/// Split a tuple item into its key element and the remaining elements.
fn split_key(op: &'static str, item: &Item, idx: usize) -> Result<(Item, Vec<Item>), String> {
    match item.elements() {
        Some(values) if idx < values.len() => {
            let key = values[idx].clone();
            let rest = values
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, value)| value.clone())
                .collect();
            Ok((key, rest))
        }
        _ => Err(format!(
            "{op} by index {idx} requires tuple items with more than {idx} elements, got {item}"
        )),
    }
}

/// A fully-buffered right-side item, pre-split under the key selector.
struct RightEntry {
    rest: Vec<Item>,
    original: Item,
}

/// Drain `other` completely and index it by key. Returns `None` after
/// forwarding an upstream fault.
async fn buffer_right(
    op: &'static str,
    mut other: Channel,
    by: &KeySelector,
    out: &crate::channel::Emitter,
) -> Result<Option<HashMap<String, Vec<RightEntry>>>, StreamError> {
    let mut index: HashMap<String, Vec<RightEntry>> = HashMap::new();
    let mut position: u64 = 0;
    while let Some(message) = other.recv().await {
        match message {
            Ok(item) => {
                let (key, rest) = match by.index() {
                    Some(idx) => split_key(op, &item, idx)
                        .map_err(|msg| StreamError::at(op, position, msg))?,
                    None => {
                        let key = by
                            .key_of(&item)
                            .map_err(|msg| StreamError::at(op, position, msg))?;
                        (key, Vec::new())
                    }
                };
                index.entry(key_repr(&key)).or_default().push(RightEntry {
                    rest,
                    original: item,
                });
                position += 1;
            }
            Err(error) => {
                forward_fault(out, error).await;
                return Ok(None);
            }
        }
    }
    Ok(Some(index))
}

impl Channel {
    /// Interleave this channel with `others` in real-time arrival order.
    ///
    /// Nondeterministic under concurrent production; already-materialized
    /// inputs drain deterministically. Closes only when every input is closed
    /// and drained.
    pub fn mix(self, others: impl IntoIterator<Item = Channel>) -> Channel {
        let mut inputs = SelectAll::new();
        inputs.push(self.into_stream());
        for channel in others {
            inputs.push(channel.into_stream());
        }
        spawn_operator("mix", move |out| async move {
            let mut inputs = inputs;
            while let Some(message) = inputs.next().await {
                match message {
                    Ok(item) => {
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

    /// Emit the entirety of this channel, then each of `others` in argument
    /// order. Sequential composition: a later channel logically starts only
    /// once every earlier one is drained, whatever the real-time production
    /// order. Pending items simply wait in their queues.
    pub fn concat(self, others: impl IntoIterator<Item = Channel>) -> Channel {
        let mut inputs = vec![self];
        inputs.extend(others);
        spawn_operator("concat", move |out| async move {
            for mut channel in inputs {
                while let Some(message) = channel.recv().await {
                    match message {
                        Ok(item) => {
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
            }
            Ok(())
        })
    }

    /// Inner-join cross product per key: every left item is paired with every
    /// right item sharing its key, `n*m` pairs per key. Keys present on only
    /// one side emit nothing.
    ///
    /// With an index selector the output is the flattened tuple
    /// `[key, left-rest…, right-rest…]`; with a key function it is the pair
    /// `[left, right]`. The right side is buffered to closure first.
    pub fn combine(self, other: Channel, by: impl Into<KeySelector>) -> Channel {
        let by = by.into();
        spawn_operator("combine", move |out| async move {
            let Some(right) = buffer_right("combine", other, &by, &out).await? else {
                return Ok(());
            };

            let mut left = self;
            let mut position: u64 = 0;
            while let Some(message) = left.recv().await {
                match message {
                    Ok(item) => {
                        let emitted = match by.index() {
                            Some(idx) => {
                                let (key, rest) = split_key("combine", &item, idx)
                                    .map_err(|msg| StreamError::at("combine", position, msg))?;
                                right
                                    .get(&key_repr(&key))
                                    .map(|matches| {
                                        matches
                                            .iter()
                                            .map(|entry| {
                                                let mut values = vec![key.clone()];
                                                values.extend(rest.iter().cloned());
                                                values.extend(entry.rest.iter().cloned());
                                                Item::Tuple(values)
                                            })
                                            .collect::<Vec<_>>()
                                    })
                                    .unwrap_or_default()
                            }
                            None => {
                                let key = by
                                    .key_of(&item)
                                    .map_err(|msg| StreamError::at("combine", position, msg))?;
                                right
                                    .get(&key_repr(&key))
                                    .map(|matches| {
                                        matches
                                            .iter()
                                            .map(|entry| {
                                                Item::Tuple(vec![
                                                    item.clone(),
                                                    entry.original.clone(),
                                                ])
                                            })
                                            .collect::<Vec<_>>()
                                    })
                                    .unwrap_or_default()
                            }
                        };
                        for pair in emitted {
                            if out.emit(pair).await.is_err() {
                                return Ok(());
                            }
                        }
                        position += 1;
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

    /// Positional pairing per key: the i-th left item for key `k` joins the
    /// i-th right item for `k`, producing `min(n, m)` flattened tuples per
    /// key; the unmatched remainder is dropped. This is the distinguishing
    /// rule versus [`Channel::combine`]'s full cross product.
    pub fn join(self, other: Channel, by: impl Into<KeySelector>) -> Channel {
        let by = by.into();
        spawn_operator("join", move |out| async move {
            let Some(right) = buffer_right("join", other, &by, &out).await? else {
                return Ok(());
            };

            let mut left = self;
            let mut taken: HashMap<String, usize> = HashMap::new();
            let mut position: u64 = 0;
            while let Some(message) = left.recv().await {
                match message {
                    Ok(item) => {
                        let (key, rest) = match by.index() {
                            Some(idx) => split_key("join", &item, idx)
                                .map_err(|msg| StreamError::at("join", position, msg))?,
                            None => {
                                let key = by
                                    .key_of(&item)
                                    .map_err(|msg| StreamError::at("join", position, msg))?;
                                (key, Vec::new())
                            }
                        };
                        let repr = key_repr(&key);
                        let slot = taken.entry(repr.clone()).or_insert(0);
                        let matched = right.get(&repr).and_then(|entries| entries.get(*slot));
                        if let Some(entry) = matched {
                            *slot += 1;
                            let pair = match by.index() {
                                Some(_) => {
                                    let mut values = vec![key];
                                    values.extend(rest);
                                    values.extend(entry.rest.iter().cloned());
                                    Item::Tuple(values)
                                }
                                None => Item::Tuple(vec![item.clone(), entry.original.clone()]),
                            };
                            if out.emit(pair).await.is_err() {
                                return Ok(());
                            }
                        }
                        position += 1;
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

    /// Unconditional Cartesian product: every left item paired with every
    /// right item as `[left, right]`, left-major order. Equivalent to
    /// [`Channel::combine`] under a constant key.
    pub fn cross(self, other: Channel) -> Channel {
        spawn_operator("cross", move |out| async move {
            let mut other = other;
            let mut right = Vec::new();
            while let Some(message) = other.recv().await {
                match message {
                    Ok(item) => right.push(item),
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }

            let mut left = self;
            while let Some(message) = left.recv().await {
                match message {
                    Ok(item) => {
                        for entry in &right {
                            let pair = Item::Tuple(vec![item.clone(), entry.clone()]);
                            if out.emit(pair).await.is_err() {
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
            Ok(())
        })
    }
}
