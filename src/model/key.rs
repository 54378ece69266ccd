//! Key extraction for keyed combinators and grouping operators.

use crate::model::Item;
use std::fmt;
use std::sync::Arc;

/// How a matching key is derived from an item.
///
/// Dispatched explicitly as a tagged variant: either a positional index into a
/// tuple item, or a user-supplied extractor function. The same selector must be
/// applied to every item reaching a keyed operator, otherwise matching silently
/// finds no pairs.
#[derive(Clone)]
pub enum KeySelector {
    /// Key is the element at this index of a `Tuple`/`List` item.
    Index(usize),
    /// Key is computed by a user function.
    Func(Arc<dyn Fn(&Item) -> Result<Item, String> + Send + Sync>),
}

impl KeySelector {
    /// Build a selector from an extractor function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Item) -> Result<Item, String> + Send + Sync + 'static,
    {
        KeySelector::Func(Arc::new(f))
    }

    /// The positional index, when this selector is index-based.
    pub fn index(&self) -> Option<usize> {
        match self {
            KeySelector::Index(idx) => Some(*idx),
            KeySelector::Func(_) => None,
        }
    }

    /// Extract the key of `item` under this selector.
    pub fn key_of(&self, item: &Item) -> Result<Item, String> {
        match self {
            KeySelector::Index(idx) => item
                .get(*idx)
                .cloned()
                .ok_or_else(|| format!("key index {idx} requires a tuple item, got {item}")),
            KeySelector::Func(f) => f(item),
        }
    }
}

impl From<usize> for KeySelector {
    fn from(index: usize) -> Self {
        KeySelector::Index(index)
    }
}

impl fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySelector::Index(idx) => f.debug_tuple("Index").field(idx).finish(),
            KeySelector::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Hashable identity of a key item.
///
/// Items are not `Hash` (floats), so grouping operators key their hash maps by
/// the debug rendering of the extracted key.
pub(crate) fn key_repr(key: &Item) -> String {
    format!("{key:?}")
}
