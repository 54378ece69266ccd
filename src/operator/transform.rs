//! Single-channel transformation operators: stateless 1:1/1:n rewrites and
//! the fully-buffering collectors.

use crate::channel::Channel;
use crate::error::StreamError;
use crate::model::Item;
use crate::operator::{forward_fault, spawn_operator};
use std::cmp::Ordering;
use std::sync::Arc;

impl Channel {
    /// Emit `f(x)` for each upstream item `x`, preserving order.
    ///
    /// A failing closure terminates the whole pipeline.
    pub fn map<F>(self, f: F) -> Channel
    where
        F: Fn(Item) -> Result<Item, String> + Send + 'static,
    {
        spawn_operator("map", move |out| async move {
            let mut upstream = self;
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        let mapped = f(item).map_err(|msg| StreamError::at("map", index, msg))?;
                        if out.emit(mapped).await.is_err() {
                            return Ok(());
                        }
                        index += 1;
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

    /// For each upstream item, emit every item of `f(x)` individually.
    ///
    /// Sequential execution: the relative order of `f(x)`'s output is kept
    /// within and across invocations.
    pub fn flat_map<F>(self, f: F) -> Channel
    where
        F: Fn(Item) -> Result<Vec<Item>, String> + Send + 'static,
    {
        spawn_operator("flat_map", move |out| async move {
            let mut upstream = self;
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        let expanded =
                            f(item).map_err(|msg| StreamError::at("flat_map", index, msg))?;
                        for produced in expanded {
                            if out.emit(produced).await.is_err() {
                                return Ok(());
                            }
                        }
                        index += 1;
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

    /// One-level flattening: `List`/`Tuple` items have their direct elements
    /// emitted individually, everything else passes through unchanged. A
    /// no-op on an already-flat stream.
    pub fn flatten(self) -> Channel {
        spawn_operator("flatten", move |out| async move {
            let mut upstream = self;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(Item::List(values)) | Ok(Item::Tuple(values)) => {
                        for value in values {
                            if out.emit(value).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
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

    /// Buffer until upstream closes, then emit exactly one `List` of all
    /// items in arrival order. Never emits on an unbounded upstream.
    pub fn collect(self) -> Channel {
        spawn_operator("collect", move |out| async move {
            let mut upstream = self;
            let mut items = Vec::new();
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => items.push(item),
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            let _ = out.emit(Item::List(items)).await;
            Ok(())
        })
    }

    /// Fold the whole upstream with `f` starting from `seed`, then emit the
    /// single final accumulator.
    pub fn reduce<F>(self, seed: impl Into<Item>, f: F) -> Channel
    where
        F: Fn(Item, Item) -> Result<Item, String> + Send + 'static,
    {
        let seed = seed.into();
        spawn_operator("reduce", move |out| async move {
            let mut upstream = self;
            let mut acc = seed;
            let mut index: u64 = 0;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        acc = f(acc, item).map_err(|msg| StreamError::at("reduce", index, msg))?;
                        index += 1;
                    }
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }
            let _ = out.emit(acc).await;
            Ok(())
        })
    }

    /// Collect the whole upstream into one `List`, preserving input order.
    pub fn to_list(self) -> Channel {
        self.collect()
    }

    /// Collect the whole upstream, sort it under the natural item order, and
    /// emit one `List`. Items of incompatible kinds fault the pipeline. The
    /// sort is stable: ties keep arrival order.
    pub fn to_sorted_list(self) -> Channel {
        Self::sorted_list_inner(self, None)
    }

    /// Like [`Channel::to_sorted_list`] with a caller-supplied total order.
    pub fn to_sorted_list_by<F>(self, comparator: F) -> Channel
    where
        F: Fn(&Item, &Item) -> Ordering + Send + Sync + 'static,
    {
        Self::sorted_list_inner(self, Some(Arc::new(comparator)))
    }

    fn sorted_list_inner(
        self,
        comparator: Option<Arc<dyn Fn(&Item, &Item) -> Ordering + Send + Sync>>,
    ) -> Channel {
        spawn_operator("to_sorted_list", move |out| async move {
            let mut upstream = self;
            let mut items = Vec::new();
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => items.push(item),
                    Err(error) => {
                        forward_fault(&out, error).await;
                        return Ok(());
                    }
                }
            }

            match comparator {
                Some(cmp) => items.sort_by(|a, b| cmp(a, b)),
                None => {
                    let mut first_error = None;
                    items.sort_by(|a, b| match a.total_cmp(b) {
                        Ok(ordering) => ordering,
                        Err(msg) => {
                            first_error.get_or_insert(msg);
                            Ordering::Equal
                        }
                    });
                    if let Some(msg) = first_error {
                        return Err(StreamError::new("to_sorted_list", msg));
                    }
                }
            }

            let _ = out.emit(Item::List(items)).await;
            Ok(())
        })
    }
}
