//! Item and record types
//!
//! Defines the data that flows through a workflow Code step:
//! - [`Record`]: the free-form field mapping of one item
//! - [`Item`]: the host envelope `{ "json": Record }`
//! - [`ItemSequence`]: the ordered batch handed in and returned

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field mapping of one item. Insertion order is preserved.
pub type Record = Map<String, Value>;

/// One unit of data passed between workflow steps
///
/// Only the `json` payload is modelled. Other envelope keys a host may send
/// (`binary`, `pairedItem`) are dropped on decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Item fields
    pub json: Record,
}

impl Item {
    /// Create item from a record
    #[inline]
    #[must_use]
    pub fn new(json: Record) -> Self {
        Self { json }
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.json.get(field)
    }

    fn from_envelope(index: usize, element: Value) -> Result<Self, ItemError> {
        let Value::Object(mut envelope) = element else {
            return Err(ItemError::NotAnItem { index });
        };

        match envelope.remove("json") {
            Some(Value::Object(json)) => Ok(Self { json }),
            Some(other) => Err(ItemError::InvalidJson {
                index,
                found: json_kind(&other),
            }),
            None => Err(ItemError::MissingJson { index }),
        }
    }

    fn to_envelope(&self) -> Value {
        let mut envelope = Map::with_capacity(1);
        envelope.insert("json".to_string(), Value::Object(self.json.clone()));
        Value::Object(envelope)
    }
}

impl From<Record> for Item {
    fn from(json: Record) -> Self {
        Self::new(json)
    }
}

/// Ordered batch of items
///
/// Serializes as a bare JSON array of item envelopes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSequence(Vec<Item>);

impl ItemSequence {
    /// Create empty sequence
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the sequence has no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Item at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    /// Iterate items in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    /// Borrow items as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Item] {
        &self.0
    }

    /// Decode a host payload
    ///
    /// # Errors
    /// Returns error if the payload is not an array, or if any element is not
    /// an object carrying an object-valued `json` field
    pub fn from_json_value(value: Value) -> Result<Self, ItemError> {
        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(ItemError::NotASequence {
                    found: json_kind(&other),
                })
            }
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| Item::from_envelope(index, element))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parse and decode a host payload
    ///
    /// # Errors
    /// Returns error if the text is not JSON or fails [`Self::from_json_value`]
    pub fn from_json_str(text: &str) -> Result<Self, ItemError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    /// Encode as an array of item envelopes
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        Value::Array(self.0.iter().map(Item::to_envelope).collect())
    }

    /// Encode as pretty-printed JSON text
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_string_pretty(&self) -> Result<String, ItemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<Vec<Item>> for ItemSequence {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl FromIterator<Item> for ItemSequence {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ItemSequence {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemSequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Name of a JSON value's kind, for error messages
#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
