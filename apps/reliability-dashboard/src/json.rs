//! Tolerant decoding for upstream documents: one bad element is skipped, not fatal.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Keeps the elements that decode as `T`; rejects are logged with a count.
pub fn lenient_list<T: DeserializeOwned>(values: Vec<Value>, what: &str) -> Vec<T> {
    let total = values.len();
    let parsed: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    let rejected = total - parsed.len();
    if rejected > 0 {
        tracing::warn!(what, rejected, total, "skipped malformed upstream entries");
    }
    parsed
}

pub fn lenient_map<T: DeserializeOwned>(
    values: BTreeMap<String, Value>,
    what: &str,
) -> BTreeMap<String, T> {
    let total = values.len();
    let parsed: BTreeMap<String, T> = values
        .into_iter()
        .filter_map(|(key, value)| Some((key, serde_json::from_value(value).ok()?)))
        .collect();
    let rejected = total - parsed.len();
    if rejected > 0 {
        tracing::warn!(what, rejected, total, "skipped malformed upstream entries");
    }
    parsed
}

/// The body itself must still be a JSON array.
pub fn lenient_list_from_slice<T: DeserializeOwned>(
    body: &[u8],
    what: &str,
) -> serde_json::Result<Vec<T>> {
    let values: Vec<Value> = serde_json::from_slice(body)?;
    Ok(lenient_list(values, what))
}

/// The body itself must still be a JSON object.
pub fn lenient_map_from_slice<T: DeserializeOwned>(
    body: &[u8],
    what: &str,
) -> serde_json::Result<BTreeMap<String, T>> {
    let values: BTreeMap<String, Value> = serde_json::from_slice(body)?;
    Ok(lenient_map(values, what))
}

/// `deserialize_with` form of [`lenient_list`]; `null` reads as empty.
pub fn deserialize_lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(lenient_list(values, "comparison records"))
}

/// `deserialize_with` for optional fields whose malformed values should read as absent.
pub fn deserialize_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
