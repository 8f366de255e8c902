//! Error types for itemflow
//!
//! The transformation itself cannot fail. Errors only arise at the edges:
//! - Decoding a host payload that is not a sequence of items
//! - Loading or validating a mapper configuration

use std::path::PathBuf;

/// Main itemflow error type
#[derive(Debug, thiserror::Error)]
pub enum ItemflowError {
    /// Host payload could not be decoded or encoded
    #[error("item payload error: {0}")]
    Item(#[from] ItemError),

    /// Mapper configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while decoding or encoding host item payloads
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Payload is valid JSON but not an array
    #[error("expected a sequence of items, found {found}")]
    NotASequence {
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// Sequence element is not an item envelope object
    #[error("item {index} is not an object")]
    NotAnItem {
        /// Position in the sequence
        index: usize,
    },

    /// Item envelope has no `json` field
    #[error("item {index} has no `json` field")]
    MissingJson {
        /// Position in the sequence
        index: usize,
    },

    /// Item `json` field is not an object
    #[error("item {index} has a `json` field of kind {found}, expected object")]
    InvalidJson {
        /// Position in the sequence
        index: usize,
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// Malformed JSON text, or encoding failure
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or validating a [`MapperConfig`](crate::MapperConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A derived field name is empty
    #[error("derived field `{setting}` must not be empty")]
    EmptyFieldName {
        /// Config key holding the empty name
        setting: &'static str,
    },

    /// Two derived fields of the active strategy share a name
    #[error("derived field name `{name}` is used more than once")]
    DuplicateFieldName {
        /// The repeated field name
        name: String,
    },

    /// Marker literal is a TOML datetime, which has no JSON form
    #[error("marker_value must be a plain scalar, array or table; TOML datetimes are not supported")]
    UnsupportedMarker,

    /// Strategy name not recognised
    #[error("unknown strategy `{0}` (expected standard, conditional or indexed)")]
    UnknownStrategy(String),
}

impl ConfigError {
    /// Check if the error comes from a bad derived field name
    #[inline]
    #[must_use]
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyFieldName { .. } | Self::DuplicateFieldName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_error_display() {
        let err = ItemError::NotASequence { found: "object" };
        assert_eq!(err.to_string(), "expected a sequence of items, found object");

        let err = ItemError::InvalidJson {
            index: 3,
            found: "string",
        };
        assert!(err.to_string().contains("item 3"));
    }

    #[test]
    fn config_error_is_field_error() {
        assert!(ConfigError::EmptyFieldName { setting: "marker_field" }.is_field_error());
        assert!(ConfigError::DuplicateFieldName { name: "x".into() }.is_field_error());
        assert!(!ConfigError::UnknownStrategy("fast".into()).is_field_error());
    }

    #[test]
    fn umbrella_converts_from_parts() {
        let err: ItemflowError = ItemError::MissingJson { index: 0 }.into();
        assert!(matches!(err, ItemflowError::Item(ItemError::MissingJson { index: 0 })));
        assert!(err.to_string().starts_with("item payload error"));
    }
}
