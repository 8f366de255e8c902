//! Mapper configuration
//!
//! Names the derived fields, selects the mapping strategy, and toggles
//! parallel mapping. Loadable from TOML; every key is optional.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which set of derived fields the mapper writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStrategy {
    /// Marker literal, processed flag, timestamp
    #[default]
    Standard,
    /// Marker is 1 or 0 by the condition field's truthiness, plus processed flag
    Conditional,
    /// Marker literal, processed-at timestamp, zero-based item index
    Indexed,
}

impl MapStrategy {
    /// Lowercase name used in config files and on the command line
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Conditional => "conditional",
            Self::Indexed => "indexed",
        }
    }
}

impl fmt::Display for MapStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "conditional" => Ok(Self::Conditional),
            "indexed" => Ok(Self::Indexed),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Mapper configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Derived field set to write
    pub strategy: MapStrategy,
    /// Name of the constant marker field
    pub marker_field: String,
    /// Literal written to the marker field. Plain scalar, array or table;
    /// TOML datetimes are rejected by [`Self::validate`].
    pub marker_value: Value,
    /// Name of the processed flag
    pub processed_field: String,
    /// Name of the timestamp field (standard strategy)
    pub timestamp_field: String,
    /// Field whose truthiness drives the marker (conditional strategy)
    pub condition_field: String,
    /// Name of the timestamp field (indexed strategy)
    pub processed_at_field: String,
    /// Name of the position field (indexed strategy)
    pub index_field: String,
    /// Map items on the rayon pool
    pub parallel: bool,
}

impl MapperConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: MapStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// With marker field name and literal
    #[inline]
    #[must_use]
    pub fn with_marker(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.marker_field = field.into();
        self.marker_value = value.into();
        self
    }

    /// With parallel mapping on or off
    #[inline]
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema or fails
    /// [`Self::validate`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or fails [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded mapper config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Derived fields written by the active strategy, as `(setting, name)`
    #[must_use]
    pub fn derived_fields(&self) -> Vec<(&'static str, &str)> {
        match self.strategy {
            MapStrategy::Standard => vec![
                ("marker_field", self.marker_field.as_str()),
                ("processed_field", self.processed_field.as_str()),
                ("timestamp_field", self.timestamp_field.as_str()),
            ],
            MapStrategy::Conditional => vec![
                ("marker_field", self.marker_field.as_str()),
                ("processed_field", self.processed_field.as_str()),
            ],
            MapStrategy::Indexed => vec![
                ("marker_field", self.marker_field.as_str()),
                ("processed_at_field", self.processed_at_field.as_str()),
                ("index_field", self.index_field.as_str()),
            ],
        }
    }

    /// Check derived field names are non-empty and distinct
    ///
    /// The conditional strategy's condition field may coincide with a derived
    /// field; it is read before any derived field is written.
    ///
    /// # Errors
    /// Returns the first empty or repeated name, or a datetime marker literal
    pub fn validate(&self) -> Result<(), ConfigError> {
        if contains_toml_datetime(&self.marker_value) {
            return Err(ConfigError::UnsupportedMarker);
        }

        if self.strategy == MapStrategy::Conditional && self.condition_field.is_empty() {
            return Err(ConfigError::EmptyFieldName {
                setting: "condition_field",
            });
        }

        let mut seen = HashSet::new();
        for (setting, name) in self.derived_fields() {
            if name.is_empty() {
                return Err(ConfigError::EmptyFieldName { setting });
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateFieldName {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Key toml uses to carry datetimes through `deserialize_any`
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

fn contains_toml_datetime(value: &Value) -> bool {
    match value {
        Value::Object(table) => {
            table.contains_key(TOML_DATETIME_KEY) || table.values().any(contains_toml_datetime)
        }
        Value::Array(values) => values.iter().any(contains_toml_datetime),
        _ => false,
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            strategy: MapStrategy::Standard,
            marker_field: "myNewField".to_string(),
            marker_value: Value::from(1),
            processed_field: "processed".to_string(),
            timestamp_field: "timestamp".to_string(),
            condition_field: "someCondition".to_string(),
            processed_at_field: "processedAt".to_string(),
            index_field: "itemIndex".to_string(),
            parallel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_names_match_host_snippet() {
        let config = MapperConfig::default();
        assert_eq!(config.strategy, MapStrategy::Standard);
        assert_eq!(
            config.derived_fields(),
            vec![
                ("marker_field", "myNewField"),
                ("processed_field", "processed"),
                ("timestamp_field", "timestamp"),
            ]
        );
        assert_eq!(config.marker_value, json!(1));
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = MapperConfig::from_toml_str("").unwrap();
        assert_eq!(config, MapperConfig::default());
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let config = MapperConfig::from_toml_str(
            r#"
            strategy = "indexed"
            marker_value = "tagged"
            index_field = "position"
            parallel = true
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy, MapStrategy::Indexed);
        assert_eq!(config.marker_value, json!("tagged"));
        assert_eq!(config.index_field, "position");
        assert_eq!(config.marker_field, "myNewField");
        assert!(config.parallel);
    }

    #[test]
    fn toml_rejects_unknown_strategy() {
        let err = MapperConfig::from_toml_str("strategy = \"fastest\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_rejects_empty_name() {
        let config = MapperConfig {
            timestamp_field: String::new(),
            ..MapperConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyFieldName {
                setting: "timestamp_field"
            }
        ));
    }

    #[test]
    fn validate_rejects_duplicate_name_in_active_strategy_only() {
        let config = MapperConfig {
            processed_field: "myNewField".to_string(),
            ..MapperConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateFieldName { .. })
        ));

        // indexed strategy does not write the processed flag
        let config = config.with_strategy(MapStrategy::Indexed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn conditional_needs_condition_field() {
        let config = MapperConfig {
            condition_field: String::new(),
            ..MapperConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config
            .with_strategy(MapStrategy::Conditional)
            .validate()
            .is_err());
    }

    #[test]
    fn toml_datetime_marker_rejected() {
        let err = MapperConfig::from_toml_str("marker_value = 1979-05-27T07:32:00Z").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedMarker));

        let err = MapperConfig::from_toml_str("marker_value = [1, { at = 1979-05-27 }]").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedMarker));
    }

    #[test]
    fn plain_marker_tables_accepted() {
        let config = MapperConfig::from_toml_str(
            r#"
            marker_value = { source = "import", tags = ["a", "b"] }
            "#,
        )
        .unwrap();
        assert_eq!(config.marker_value, json!({"source": "import", "tags": ["a", "b"]}));

        let config = MapperConfig::default()
            .with_marker("myNewField", json!({"nested": [{"$__toml_private_datetime": "x"}]}));
        assert!(matches!(config.validate(), Err(ConfigError::UnsupportedMarker)));
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!("Indexed".parse::<MapStrategy>().unwrap(), MapStrategy::Indexed);
        assert_eq!(" conditional ".parse::<MapStrategy>().unwrap(), MapStrategy::Conditional);
        assert!(matches!(
            "other".parse::<MapStrategy>(),
            Err(ConfigError::UnknownStrategy(_))
        ));
        assert_eq!(MapStrategy::Standard.to_string(), "standard");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = MapperConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapper.toml");
        std::fs::write(&path, "marker_field = \"flag\"\n").unwrap();

        let config = MapperConfig::load(&path).unwrap();
        assert_eq!(config.marker_field, "flag");
    }
}
