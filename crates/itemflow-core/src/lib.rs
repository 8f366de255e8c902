//! itemflow Core - item-preserving record transformation
//!
//! Maps the batch of items a workflow host hands to a Code step into a new
//! batch of the same length and order:
//! - Each output record is a shallow copy of its input record
//! - Derived fields (marker, processed flag, timestamp) are set on top
//! - Input items are borrowed and never mutated
//! - Timestamps come from an injectable [`Clock`]
//!
//! # Example
//!
//! ```rust
//! use itemflow_core::{FixedClock, ItemMapper, ItemSequence, MapperConfig};
//!
//! let clock = FixedClock::parse("2024-05-01T12:00:00Z").unwrap();
//! let mapper = ItemMapper::with_clock(MapperConfig::default(), clock);
//!
//! let input = ItemSequence::from_json_str(r#"[{"json": {"a": 1}}]"#).unwrap();
//! let output = mapper.transform(&input);
//!
//! assert_eq!(output.len(), 1);
//! assert_eq!(output.get(0).unwrap().json["timestamp"], "2024-05-01T12:00:00.000Z");
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod clock;
pub mod config;
pub mod error;
pub mod mapper;
pub mod types;

// Re-exports for convenience
pub use clock::{iso8601, Clock, FixedClock, SystemClock};
pub use config::{MapStrategy, MapperConfig};
pub use error::{ConfigError, ItemError, ItemflowError};
pub use mapper::{is_truthy, transform, ItemMapper};
pub use types::{json_kind, Item, ItemSequence, Record};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
