//! Request body recovery.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use bytes::Bytes;
use serde_json::Value;

use crate::types::{Error, Result};

/// Standard alphabet that tolerates missing or present padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Turn the event's `body` field into raw bytes.
///
/// - absent, `null`, `""` and other falsy JSON (`false`, `0`, `{}`, `[]`)
///   give an empty body;
/// - a string is base64-decoded when `is_base64` is set (ASCII whitespace is
///   ignored), otherwise taken as UTF-8 text;
/// - any other JSON value is re-serialized as compact JSON text.
pub fn recover_body(body: Option<&Value>, is_base64: bool) -> Result<Bytes> {
    let Some(body) = body else {
        return Ok(Bytes::new());
    };
    if is_falsy(body) {
        return Ok(Bytes::new());
    }

    match body {
        Value::String(text) if is_base64 => {
            let compact: Vec<u8> = text
                .bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            LENIENT_BASE64
                .decode(compact)
                .map(Bytes::from)
                .map_err(|e| Error::malformed_event(format!("body is not valid base64: {e}")))
        }
        Value::String(text) => Ok(Bytes::from(text.clone().into_bytes())),
        other => Ok(Bytes::from(other.to_string().into_bytes())),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
