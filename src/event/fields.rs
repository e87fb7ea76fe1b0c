//! Lenient deserializers for event maps.
//!
//! Gateways send `null` for absent maps and sometimes for individual values
//! (`"queryStringParameters": {"flag": null}`). These helpers normalize such
//! maps into ordered pair lists while still rejecting structurally wrong input.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// `{name: value}` map. Entries keep their wire order; `null` values are kept
/// as `None` so callers can decide whether an entry with no value counts.
pub fn single_map<'de, D>(deserializer: D) -> Result<Option<Vec<(String, Option<String>)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(map) = Option::<Map<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let value = scalar(value).map_err(|e| D::Error::custom(format!("key `{key}`: {e}")))?;
        entries.push((key, value));
    }
    Ok(Some(entries))
}

/// `{name: [values]}` map. A bare scalar stands for a one-element list and
/// `null` elements are dropped.
pub fn multi_map<'de, D>(deserializer: D) -> Result<Option<Vec<(String, Vec<String>)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(map) = Option::<Map<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let values = match value {
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(v) = scalar(item)
                        .map_err(|e| D::Error::custom(format!("key `{key}`: {e}")))?
                    {
                        values.push(v);
                    }
                }
                values
            }
            other => scalar(other)
                .map_err(|e| D::Error::custom(format!("key `{key}`: {e}")))?
                .into_iter()
                .collect(),
        };
        entries.push((key, values));
    }
    Ok(Some(entries))
}

fn scalar(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) => Err("expected a string, found an array".to_string()),
        Value::Object(_) => Err("expected a string, found an object".to_string()),
    }
}
