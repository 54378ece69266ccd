//! Terminal sinks and aggregates.
//!
//! Aggregates fully consume their upstream before resolving, so none of them
//! can complete on a channel that never closes. All of them surface the first
//! in-band fault as their error.

use crate::channel::Channel;
use crate::error::FlowError;
use crate::model::Item;
use crate::operator::{forward_fault, spawn_operator};
use std::cmp::Ordering;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// How file sinks treat an existing target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace existing content (the default).
    #[default]
    Overwrite,
    /// Keep existing content and append after it.
    Append,
}

enum NumericAcc {
    Int(i64),
    Float(f64),
}

impl NumericAcc {
    fn add(&mut self, item: &Item) -> Result<(), FlowError> {
        match (&*self, item) {
            (NumericAcc::Int(acc), Item::Int(v)) => {
                let total = acc.checked_add(*v).ok_or_else(|| {
                    FlowError::Overflow(format!("sum exceeded i64 range at {acc} + {v}"))
                })?;
                *self = NumericAcc::Int(total);
            }
            (NumericAcc::Int(acc), Item::Float(v)) => *self = NumericAcc::Float(*acc as f64 + v),
            (NumericAcc::Float(acc), Item::Int(v)) => *self = NumericAcc::Float(acc + *v as f64),
            (NumericAcc::Float(acc), Item::Float(v)) => *self = NumericAcc::Float(acc + v),
            _ => {
                return Err(FlowError::TypeMismatch(format!(
                    "sum requires numeric items, got {}",
                    item.kind()
                )))
            }
        }
        Ok(())
    }

    fn into_item(self) -> Item {
        match self {
            NumericAcc::Int(v) => Item::Int(v),
            NumericAcc::Float(v) => Item::Float(v),
        }
    }
}

impl Channel {
    /// Number of items in the channel.
    pub async fn count(mut self) -> Result<u64, FlowError> {
        let mut count = 0u64;
        while let Some(message) = self.recv().await {
            message?;
            count += 1;
        }
        Ok(count)
    }

    /// Numeric sum over all items. Integer until the first float appears,
    /// float afterwards; an empty channel sums to `Int(0)`. Non-numeric items
    /// are a type-mismatch fault.
    pub async fn sum(mut self) -> Result<Item, FlowError> {
        let mut acc = NumericAcc::Int(0);
        while let Some(message) = self.recv().await {
            acc.add(&message?)?;
        }
        Ok(acc.into_item())
    }

    /// Smallest item under the natural total order. Mixed-kind streams fail,
    /// an empty channel is an [`FlowError::EmptyAggregation`].
    pub async fn min(self) -> Result<Item, FlowError> {
        self.extremum(Ordering::Less).await
    }

    /// Largest item under the natural total order.
    pub async fn max(self) -> Result<Item, FlowError> {
        self.extremum(Ordering::Greater).await
    }

    async fn extremum(mut self, wanted: Ordering) -> Result<Item, FlowError> {
        let mut best: Option<Item> = None;
        while let Some(message) = self.recv().await {
            let item = message?;
            match &best {
                None => best = Some(item),
                Some(current) => {
                    let ordering = item
                        .total_cmp(current)
                        .map_err(FlowError::TypeMismatch)?;
                    if ordering == wanted {
                        best = Some(item);
                    }
                }
            }
        }
        best.ok_or(FlowError::EmptyAggregation)
    }

    /// Arithmetic mean of all items. Non-numeric items are a type-mismatch
    /// fault; an empty channel is a defined error, not a default value.
    pub async fn mean(mut self) -> Result<f64, FlowError> {
        let mut total = 0.0f64;
        let mut count = 0u64;
        while let Some(message) = self.recv().await {
            let item = message?;
            let value = item.as_f64().ok_or_else(|| {
                FlowError::TypeMismatch(format!("mean requires numeric items, got {}", item.kind()))
            })?;
            total += value;
            count += 1;
        }
        if count == 0 {
            return Err(FlowError::EmptyAggregation);
        }
        Ok(total / count as f64)
    }

    /// Write each item's display rendering to `path` as one line per item, in
    /// arrival order. `mode` governs overwrite versus append.
    pub async fn collect_file(
        mut self,
        path: impl AsRef<Path>,
        mode: WriteMode,
    ) -> Result<(), FlowError> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true);
        match mode {
            WriteMode::Overwrite => options.truncate(true),
            WriteMode::Append => options.append(true),
        };
        let mut file = options.open(path.as_ref()).await?;

        while let Some(message) = self.recv().await {
            let item = message?;
            let mut line = item.to_string();
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// Serialize each item as one JSON document per line, overwriting `path`.
    pub async fn save(mut self, path: impl AsRef<Path>) -> Result<(), FlowError> {
        let mut file = tokio::fs::File::create(path.as_ref()).await?;
        while let Some(message) = self.recv().await {
            let item = message?;
            let mut line = serde_json::to_string(&item.to_json())?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// Pass every item through unchanged while printing its display rendering
    /// in arrival order.
    pub fn view(self) -> Channel {
        self.view_with(|item: &Item| item.to_string())
    }

    /// Pass-through with a custom line formatter.
    pub fn view_with<F>(self, formatter: F) -> Channel
    where
        F: Fn(&Item) -> String + Send + 'static,
    {
        spawn_operator("view", move |out| async move {
            let mut upstream = self;
            while let Some(message) = upstream.recv().await {
                match message {
                    Ok(item) => {
                        println!("{}", formatter(&item));
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

    /// Invoke `action` for every item in arrival order, resolving when
    /// upstream closes.
    pub async fn subscribe<F>(mut self, mut action: F) -> Result<(), FlowError>
    where
        F: FnMut(&Item),
    {
        while let Some(message) = self.recv().await {
            action(&message?);
        }
        Ok(())
    }
}
