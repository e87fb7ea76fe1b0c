//! Application response → outbound envelope translation.
//!
//! Translation rules:
//!   headers            → `multiValueHeaders` if the event had them, else
//!                        `headers` with repeated names case-permuted
//!   load balancer      → `statusDescription = "<code> <reason>"`
//!   textual, unencoded → `body` as text, `isBase64Encoded = false`
//!   anything else      → `body` base64, `isBase64Encoded = true`
//!   empty body         → neither `body` nor `isBase64Encoded`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::event::InboundEvent;
use crate::headers::{group_headers, split_headers, MultiValuedHeaders};
use crate::types::{Error, Result};

/// MIME types outside `text/*` that are still sent as text.
pub const TEXT_MIME_TYPES: &[&str] = &[
    "application/json",
    "application/javascript",
    "application/xml",
    "application/vnd.api+json",
    "image/svg+xml",
];

/// MIME type assumed when the response does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// What the application hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: MultiValuedHeaders,
    body: Bytes,
}

impl Response {
    /// Response with the given status, no headers and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: MultiValuedHeaders::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: MultiValuedHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &MultiValuedHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Media type of `Content-Type` without parameters, lowercased.
    pub fn mimetype(&self) -> Option<String> {
        self.headers
            .get("Content-Type")
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
            .filter(|mt| !mt.is_empty())
    }

    /// `Content-Encoding`, if set to something non-empty.
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers
            .get("Content-Encoding")
            .filter(|enc| !enc.trim().is_empty())
    }
}

/// Ordered header map serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields<V>(pub Vec<(String, V)>);

impl<V> HeaderFields<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for HeaderFields<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Header field of the envelope; exactly one is emitted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum EnvelopeHeaders {
    #[serde(rename = "headers")]
    Single(HeaderFields<String>),
    #[serde(rename = "multiValueHeaders")]
    Multi(HeaderFields<Vec<String>>),
}

/// Body field pair of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeBody {
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Reply returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope {
    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,

    #[serde(flatten)]
    pub headers: EnvelopeHeaders,

    #[serde(flatten)]
    pub body: Option<EnvelopeBody>,
}

impl OutboundEnvelope {
    /// Single-valued header, when the envelope uses `headers`.
    pub fn header(&self, name: &str) -> Option<&str> {
        match &self.headers {
            EnvelopeHeaders::Single(fields) => fields.get(name).map(String::as_str),
            EnvelopeHeaders::Multi(_) => None,
        }
    }

    /// Multi-valued header, when the envelope uses `multiValueHeaders`.
    pub fn multi_value_header(&self, name: &str) -> Option<&[String]> {
        match &self.headers {
            EnvelopeHeaders::Multi(fields) => fields.get(name).map(Vec::as_slice),
            EnvelopeHeaders::Single(_) => None,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Builds [`OutboundEnvelope`]s from application responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTranslator;

impl ResponseTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translate `response` into the envelope shape `event` expects.
    ///
    /// Fails only when a load balancer request gets a status code without a
    /// standard reason phrase.
    pub fn translate(&self, response: &Response, event: &InboundEvent) -> Result<OutboundEnvelope> {
        let headers = if event.has_multi_value_headers() {
            EnvelopeHeaders::Multi(HeaderFields(group_headers(response.headers())))
        } else {
            EnvelopeHeaders::Single(HeaderFields(split_headers(response.headers())))
        };

        let status_description = if event.is_load_balancer() {
            Some(status_description(response.status())?)
        } else {
            None
        };

        let envelope = OutboundEnvelope {
            status_code: response.status(),
            status_description,
            headers,
            body: encode_body(response),
        };

        tracing::debug!(
            status = envelope.status_code,
            base64 = envelope.body.as_ref().map(|b| b.is_base64_encoded),
            "response_translated"
        );

        Ok(envelope)
    }
}

/// `"<code> <reason phrase>"`, e.g. `"404 Not Found"`.
pub fn status_description(code: u16) -> Result<String> {
    http::StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .map(|reason| format!("{code} {reason}"))
        .ok_or_else(|| Error::unsupported_status_code(code))
}

/// `true` for MIME types sent as text.
pub fn is_text_mime_type(mimetype: &str) -> bool {
    mimetype.starts_with("text/") || TEXT_MIME_TYPES.contains(&mimetype)
}

fn encode_body(response: &Response) -> Option<EnvelopeBody> {
    let data = response.body();
    if data.is_empty() {
        return None;
    }

    let mimetype = response
        .mimetype()
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    if is_text_mime_type(&mimetype) && response.content_encoding().is_none() {
        if let Ok(text) = std::str::from_utf8(data) {
            return Some(EnvelopeBody {
                body: text.to_string(),
                is_base64_encoded: false,
            });
        }
        tracing::debug!(mimetype = %mimetype, "textual_body_not_utf8: sending base64");
    }

    Some(EnvelopeBody {
        body: STANDARD.encode(data),
        is_base64_encoded: true,
    })
}
