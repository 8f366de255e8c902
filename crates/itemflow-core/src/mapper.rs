//! Item mapper
//!
//! Builds a fresh output sequence from a borrowed input sequence. Every
//! output record is a shallow copy of the input record at the same position
//! with the strategy's derived fields set on top. Inputs are never touched.

use crate::clock::{iso8601, Clock, SystemClock};
use crate::config::{MapStrategy, MapperConfig};
use crate::error::ItemflowError;
use crate::types::{Item, ItemSequence};
use rayon::prelude::*;
use serde_json::Value;

/// Maps item sequences to new item sequences
#[derive(Debug, Clone)]
pub struct ItemMapper<C = SystemClock> {
    config: MapperConfig,
    clock: C,
}

impl ItemMapper<SystemClock> {
    /// Create mapper reading the wall clock
    #[inline]
    #[must_use]
    pub fn new(config: MapperConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create mapper reading the wall clock from a validated configuration
    ///
    /// # Errors
    /// Returns error if `config` fails [`MapperConfig::validate`]
    pub fn try_new(config: MapperConfig) -> Result<Self, ItemflowError> {
        Self::try_with_clock(config, SystemClock)
    }
}

impl Default for ItemMapper<SystemClock> {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl<C: Clock> ItemMapper<C> {
    /// Create mapper with an explicit time source
    #[inline]
    #[must_use]
    pub fn with_clock(config: MapperConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Create mapper with an explicit time source, validating `config` first
    ///
    /// # Errors
    /// Returns error if `config` fails [`MapperConfig::validate`]
    pub fn try_with_clock(config: MapperConfig, clock: C) -> Result<Self, ItemflowError> {
        config.validate()?;
        Ok(Self::with_clock(config, clock))
    }

    /// Map every item to a newly built item
    ///
    /// Output has the same length and order as `items`. An empty input gives
    /// an empty output. With `parallel` set, items are mapped on the rayon
    /// pool and collected back in input order.
    #[must_use]
    pub fn transform(&self, items: &ItemSequence) -> ItemSequence {
        let mapped: Vec<Item> = if self.config.parallel {
            items
                .as_slice()
                .par_iter()
                .enumerate()
                .map(|(index, item)| self.map_item(index, item))
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| self.map_item(index, item))
                .collect()
        };

        tracing::debug!(
            strategy = %self.config.strategy,
            parallel = self.config.parallel,
            "Processed items: {}",
            mapped.len()
        );
        ItemSequence::from(mapped)
    }

    /// Build the output item for the input at `index`
    ///
    /// Derived fields overwrite same-named input fields in place; they are
    /// never merged with the old value.
    #[must_use]
    pub fn map_item(&self, index: usize, item: &Item) -> Item {
        let config = &self.config;
        let mut json = item.json.clone();

        match config.strategy {
            MapStrategy::Standard => {
                json.insert(config.marker_field.clone(), config.marker_value.clone());
                json.insert(config.processed_field.clone(), Value::Bool(true));
                json.insert(config.timestamp_field.clone(), self.stamp());
            }
            MapStrategy::Conditional => {
                let hit = json.get(&config.condition_field).is_some_and(is_truthy);
                json.insert(config.marker_field.clone(), Value::from(u8::from(hit)));
                json.insert(config.processed_field.clone(), Value::Bool(true));
            }
            MapStrategy::Indexed => {
                json.insert(config.marker_field.clone(), config.marker_value.clone());
                json.insert(config.processed_at_field.clone(), self.stamp());
                json.insert(config.index_field.clone(), Value::from(index));
            }
        }

        Item::new(json)
    }

    /// Decode a host payload, map it, and encode the result
    ///
    /// # Errors
    /// Returns error if `payload` is not a JSON array of item envelopes
    pub fn transform_json(&self, payload: &str) -> Result<String, ItemflowError> {
        let items = ItemSequence::from_json_str(payload)?;
        let output = self.transform(&items);
        Ok(output.to_json_string_pretty()?)
    }

    fn stamp(&self) -> Value {
        Value::String(iso8601(self.clock.now()))
    }
}

/// Map `items` with the default configuration and the wall clock
#[must_use]
pub fn transform(items: &ItemSequence) -> ItemSequence {
    ItemMapper::new(MapperConfig::default()).transform(items)
}

/// Truthiness as workflow scripts see it
///
/// `null`, `false`, numeric zero and the empty string are falsy. Everything
/// else is truthy, including empty arrays and objects.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
