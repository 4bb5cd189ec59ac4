//! Tolerant field decoders for loosely-typed server payloads.
//!
//! The backend serializes decimals as strings (`"12.50"`) but fixtures and
//! older endpoints send plain numbers. Both decode to the same text form.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes a decimal sent as a string, number or `null` into its text form.
///
/// `null` becomes `"0"`; other shapes become an empty string.
pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => String::new(),
    })
}

/// Decodes an optional decimal; `null` stays `None`.
pub fn opt_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodes a nullable string into an owned string, mapping `null` to empty.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
