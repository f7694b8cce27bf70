//! Structured record payloads.
//!
//! A `FieldBag` is built fresh at each call site and consumed by the emitting
//! call. Entries keep insertion order so that rendered output is stable.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Loosely-typed value of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Nested(FieldBag),
    /// Rendered error description, including its source chain.
    Error(String),
}

impl FieldValue {
    /// Describe an error and every `source()` below it, joined by ": ".
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut description = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        FieldValue::Error(description)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Str(v.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<FieldBag> for FieldValue {
    fn from(v: FieldBag) -> Self {
        FieldValue::Nested(v)
    }
}

macro_rules! int_field {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::Int(i64::from(v))
                }
            }
        )*
    };
}

int_field!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_field {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

wide_int_field!(u64, usize, isize);

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => write_text(f, s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Nested(bag) => write!(f, "{{{}}}", bag),
        }
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"') {
        write!(f, "{:?}", s)
    } else {
        f.write_str(s)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => serializer.serialize_str(s),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Nested(bag) => bag.serialize(serializer),
        }
    }
}

/// Ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBag {
    entries: Vec<(String, FieldValue)>,
}

impl FieldBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for [`FieldBag::new`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return the bag with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`. An existing key keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge `other` into this bag; its entries win on collision.
    pub fn extend(&mut self, other: FieldBag) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl fmt::Display for FieldBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl Serialize for FieldBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl IntoIterator for FieldBag {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = FieldBag::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

/// Build a [`FieldBag`] from `key => value` pairs.
///
/// ```
/// let bag = request_logger::fields! { "iter" => 2, "data" => "payload" };
/// assert_eq!(bag.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::logging::FieldBag::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::logging::FieldBag::new()$(.with($key, $value))+
    };
}
