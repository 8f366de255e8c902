//! Testing utilities for itemflow workspace
//!
//! Shared fixtures, strategies, and assertions.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use itemflow_core::{FixedClock, Item, ItemSequence, Record};
use proptest::prelude::*;
use serde_json::{json, Value};

pub const FIXED_INSTANT: &str = "2024-05-01T12:00:00.000Z";

pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock::new(fixed_instant())
}

/// Item from a JSON object literal
pub fn item(json: Value) -> Item {
    match json {
        Value::Object(record) => Item::new(record),
        other => panic!("item fixture must be an object, got {other}"),
    }
}

/// Sequence from JSON object literals
pub fn sequence(records: Vec<Value>) -> ItemSequence {
    records.into_iter().map(item).collect()
}

/// The two-item batch from the host error report
pub fn sample_items() -> ItemSequence {
    sequence(vec![json!({"a": 1}), json!({"b": 2})])
}

/// Host payload text for [`sample_items`]
pub fn sample_payload() -> String {
    r#"[{"json": {"a": 1}}, {"json": {"b": 2}}]"#.to_string()
}

pub fn assert_iso8601(value: &Value) {
    let text = value
        .as_str()
        .unwrap_or_else(|| panic!("timestamp must be a string, got {value}"));
    assert!(
        DateTime::parse_from_rfc3339(text).is_ok(),
        "timestamp `{text}` is not RFC 3339"
    );
    assert!(text.ends_with('Z'), "timestamp `{text}` is not UTC");
}

/// Arbitrary JSON leaf or shallow container
pub fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Arbitrary record whose keys may collide with default derived fields
pub fn arb_record() -> impl Strategy<Value = Record> {
    let key = prop_oneof![
        4 => "[a-z]{1,8}",
        1 => Just("timestamp".to_string()),
        1 => Just("processed".to_string()),
        1 => Just("myNewField".to_string()),
    ];
    // pairs keep generation order, so records are not always key-sorted
    prop::collection::vec((key, arb_value()), 0..6).prop_map(|pairs| pairs.into_iter().collect())
}

pub fn arb_sequence() -> impl Strategy<Value = ItemSequence> {
    prop::collection::vec(arb_record().prop_map(Item::new), 0..24)
        .prop_map(ItemSequence::from)
}
