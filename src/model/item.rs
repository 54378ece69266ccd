//! Dynamic item values carried by channels.

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Discriminator for the runtime kind of an [`Item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Path,
    Tuple,
    List,
    Map,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Null => "null",
            ItemKind::Bool => "bool",
            ItemKind::Int => "int",
            ItemKind::Float => "float",
            ItemKind::Str => "str",
            ItemKind::Path => "path",
            ItemKind::Tuple => "tuple",
            ItemKind::List => "list",
            ItemKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// A unit of data flowing through a channel.
///
/// Items are dynamically typed: a single channel may carry heterogeneous
/// values. `Tuple` is the fixed-arity shape used by keyed combinators, `List`
/// is the shape produced by grouping/batching operators, and `Map` keeps
/// insertion-ordered name/value pairs (splitter records with named fields).
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Missing/unknown value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Inline string content.
    Str(String),
    /// File-system path handed to splitters or process boundaries.
    Path(PathBuf),
    /// Fixed-arity ordered sequence used for key-based matching.
    Tuple(Vec<Item>),
    /// Variable-length collection, e.g. an emitted group or batch.
    List(Vec<Item>),
    /// Insertion-ordered mapping from field name to value.
    Map(Vec<(String, Item)>),
}

impl Item {
    /// Build a tuple item.
    pub fn tuple(values: Vec<Item>) -> Self {
        Item::Tuple(values)
    }

    /// Build a list item.
    pub fn list(values: Vec<Item>) -> Self {
        Item::List(values)
    }

    /// Build a map item from name/value pairs, keeping insertion order.
    pub fn map(pairs: Vec<(String, Item)>) -> Self {
        Item::Map(pairs)
    }

    /// Runtime kind of this item.
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Null => ItemKind::Null,
            Item::Bool(_) => ItemKind::Bool,
            Item::Int(_) => ItemKind::Int,
            Item::Float(_) => ItemKind::Float,
            Item::Str(_) => ItemKind::Str,
            Item::Path(_) => ItemKind::Path,
            Item::Tuple(_) => ItemKind::Tuple,
            Item::List(_) => ItemKind::List,
            Item::Map(_) => ItemKind::Map,
        }
    }

    /// Elements of a `Tuple` or `List` item, if it is one.
    pub fn elements(&self) -> Option<&[Item]> {
        match self {
            Item::Tuple(values) | Item::List(values) => Some(values),
            _ => None,
        }
    }

    /// Positional element access on `Tuple`/`List` items.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.elements().and_then(|values| values.get(index))
    }

    /// Field access by name on `Map` items.
    pub fn get_field(&self, name: &str) -> Option<&Item> {
        match self {
            Item::Map(pairs) => pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Numeric view of this item, when it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Item::Int(v) => Some(*v as f64),
            Item::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total-order comparison between items of compatible kinds.
    ///
    /// `Int` and `Float` compare numerically across kinds; tuples and lists
    /// compare lexicographically element by element. Any other mixed-kind
    /// comparison is an error, which aggregates turn into a pipeline fault.
    pub fn total_cmp(&self, other: &Item) -> Result<Ordering, String> {
        match (self, other) {
            (Item::Null, Item::Null) => Ok(Ordering::Equal),
            (Item::Bool(a), Item::Bool(b)) => Ok(a.cmp(b)),
            (Item::Int(a), Item::Int(b)) => Ok(a.cmp(b)),
            (Item::Str(a), Item::Str(b)) => Ok(a.cmp(b)),
            (Item::Path(a), Item::Path(b)) => Ok(a.cmp(b)),
            (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => {
                // Int/Float cross comparison goes through f64.
                let lhs = a.as_f64().unwrap_or_default();
                let rhs = b.as_f64().unwrap_or_default();
                Ok(lhs.total_cmp(&rhs))
            }
            (Item::Tuple(a), Item::Tuple(b)) | (Item::List(a), Item::List(b)) => {
                for (lhs, rhs) in a.iter().zip(b.iter()) {
                    match lhs.total_cmp(rhs)? {
                        Ordering::Equal => continue,
                        unequal => return Ok(unequal),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (a, b) => Err(format!("cannot compare {} with {}", a.kind(), b.kind())),
        }
    }

    /// Convert a JSON document into an item.
    pub fn from_json(value: JsonValue) -> Item {
        match value {
            JsonValue::Null => Item::Null,
            JsonValue::Bool(b) => Item::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Item::Int(i)
                } else {
                    Item::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Item::Str(s),
            JsonValue::Array(values) => {
                Item::List(values.into_iter().map(Item::from_json).collect())
            }
            JsonValue::Object(map) => Item::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Item::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Render this item as a JSON document (used by the `save` sink).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Item::Null => JsonValue::Null,
            Item::Bool(b) => JsonValue::Bool(*b),
            Item::Int(v) => JsonValue::Number(JsonNumber::from(*v)),
            Item::Float(v) => JsonNumber::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Item::Str(s) => JsonValue::String(s.clone()),
            Item::Path(p) => JsonValue::String(p.display().to_string()),
            Item::Tuple(values) | Item::List(values) => {
                JsonValue::Array(values.iter().map(Item::to_json).collect())
            }
            Item::Map(pairs) => {
                let mut map = JsonMap::with_capacity(pairs.len());
                for (key, value) in pairs {
                    map.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }
}

/// Display rendering used by `view`, pattern filters and the line-based file
/// sink. Strings render bare at the top level and nested collections render in
/// bracketed form.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Null => f.write_str("null"),
            Item::Bool(b) => write!(f, "{b}"),
            Item::Int(v) => write!(f, "{v}"),
            Item::Float(v) => write!(f, "{v}"),
            Item::Str(s) => f.write_str(s),
            Item::Path(p) => write!(f, "{}", p.display()),
            Item::Tuple(values) | Item::List(values) => {
                f.write_str("[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Item::Map(pairs) => {
                f.write_str("{")?;
                for (idx, (key, value)) in pairs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::Bool(value)
    }
}

impl From<i32> for Item {
    fn from(value: i32) -> Self {
        Item::Int(value as i64)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Item::Int(value)
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Item::Float(value)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Item::Str(value.to_string())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Item::Str(value)
    }
}

impl From<PathBuf> for Item {
    fn from(value: PathBuf) -> Self {
        Item::Path(value)
    }
}

impl From<Vec<Item>> for Item {
    fn from(values: Vec<Item>) -> Self {
        Item::List(values)
    }
}
