//! Data model: dynamic items and key extraction.

pub mod item;
pub mod key;

pub use item::{Item, ItemKind};
pub use key::KeySelector;

pub(crate) use key::key_repr;
