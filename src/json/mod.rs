//! JSON adapter
//!
//! - `converter.rs` - JSON <-> `Value`/`Attributes` conversion and input parsing

mod converter;

pub use converter::{JsonInputs, JsonToValueConverter, ValueToJsonConverter};

use crate::core::Attributes;

/// Renders an attribute bag as a JSON object.
pub fn attributes_to_json(attributes: &Attributes) -> serde_json::Value {
    ValueToJsonConverter::attributes_to_json(attributes)
}
