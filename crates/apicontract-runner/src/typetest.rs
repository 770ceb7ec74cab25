//! Runtime predicates for canonical data types
//!
//! JSON values are tested by their shape. Header values only exist as
//! text, so they are tested by parsing.

use apicontract_core::DataType;
use serde_json::Value;

/// Does `value` have the shape of `data_type`?
///
/// `String` accepts the empty string; `Object` means a JSON object only,
/// arrays are not objects here.
#[must_use]
pub fn accepts(data_type: DataType, value: &Value) -> bool {
    match data_type {
        DataType::String => value.is_string(),
        DataType::Object => value.is_object(),
        DataType::Array => value.is_array(),
        DataType::Boolean => value.is_boolean(),
        DataType::Number => value.is_number(),
    }
}

/// Does header text parse as `data_type`?
#[must_use]
pub fn accepts_text(data_type: DataType, text: &str) -> bool {
    let text = text.trim();
    match data_type {
        DataType::String => true,
        DataType::Number => text.parse::<f64>().is_ok_and(f64::is_finite),
        DataType::Boolean => matches!(text, "true" | "false"),
        DataType::Object => serde_json::from_str::<Value>(text).is_ok_and(|v| v.is_object()),
        DataType::Array => serde_json::from_str::<Value>(text).is_ok_and(|v| v.is_array()),
    }
}

/// JSON kind name used in diagnostics ("null", "number", ...).
#[must_use]
pub const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
