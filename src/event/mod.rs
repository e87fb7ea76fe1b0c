//! Inbound function events.
//!
//! An event arrives as JSON in one of three payload formats:
//!
//! ```text
//!   version == "2.0"      → HTTP API (payload 2.0)   requestContext.http.*, rawPath, rawQueryString
//!   version == "1.0"      → REST API (payload 1.0)   httpMethod, path, *QueryStringParameters
//!   no / other version    → unversioned, REST rules  (load balancer events land here)
//! ```
//!
//! Detection happens once in [`InboundEvent::from_value`], which then parses
//! the fields of the detected format into a typed struct. The load balancer
//! flag (`requestContext.elb`) is orthogonal to the format. The verbatim JSON
//! is kept for pass-through to the application.

mod body;
pub mod fields;
mod query;

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::headers::MultiValuedHeaders;
use crate::types::{Error, Result};

pub use body::recover_body;
pub use query::{decode_path, encode_query};

/// Payload format of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// HTTP API, payload format 2.0.
    V2,
    /// REST API, payload format 1.0.
    V1,
    /// No version marker (load balancers, older gateways).
    Unversioned,
}

impl PayloadFormat {
    /// Pick the format from the event's `version` marker.
    pub fn detect(event: &Value) -> Self {
        match event.get("version").and_then(Value::as_str) {
            Some("2.0") => PayloadFormat::V2,
            Some("1.0") => PayloadFormat::V1,
            _ => PayloadFormat::Unversioned,
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::V2 => f.write_str("2.0"),
            PayloadFormat::V1 => f.write_str("1.0"),
            PayloadFormat::Unversioned => f.write_str("unversioned"),
        }
    }
}

/// Extraction rules one payload format supplies.
trait PayloadRules {
    fn method(&self) -> &str;
    /// Path as sent, before percent-decoding.
    fn raw_path(&self) -> &str;
    fn query_string(&self, load_balancer: bool) -> String;
    fn remote_addr(&self) -> &str;
    /// Cookies delivered outside the header map.
    fn cookies(&self) -> &[String] {
        &[]
    }
}

// =============================================================================
// Payload 2.0
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpApiEvent {
    raw_path: String,
    raw_query_string: Option<String>,
    cookies: Option<Vec<String>>,
    request_context: Option<HttpApiRequestContext>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct HttpApiRequestContext {
    http: Option<HttpDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpDescription {
    method: Option<String>,
    source_ip: Option<String>,
}

impl HttpApiEvent {
    fn http(&self) -> Option<&HttpDescription> {
        self.request_context.as_ref().and_then(|c| c.http.as_ref())
    }
}

impl PayloadRules for HttpApiEvent {
    fn method(&self) -> &str {
        self.http()
            .and_then(|h| h.method.as_deref())
            .unwrap_or("")
    }

    fn raw_path(&self) -> &str {
        &self.raw_path
    }

    fn query_string(&self, _load_balancer: bool) -> String {
        self.raw_query_string.clone().unwrap_or_default()
    }

    fn remote_addr(&self) -> &str {
        self.http()
            .and_then(|h| h.source_ip.as_deref())
            .unwrap_or("")
    }

    fn cookies(&self) -> &[String] {
        self.cookies.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// Payload 1.0 and unversioned
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestApiEvent {
    http_method: Option<String>,
    path: String,
    #[serde(default, deserialize_with = "fields::multi_map")]
    multi_value_query_string_parameters: Option<Vec<(String, Vec<String>)>>,
    #[serde(default, deserialize_with = "fields::single_map")]
    query_string_parameters: Option<Vec<(String, Option<String>)>>,
    #[serde(default, deserialize_with = "fields::multi_map")]
    query: Option<Vec<(String, Vec<String>)>>,
    request_context: Option<RestRequestContext>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RestRequestContext {
    identity: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    source_ip: Option<String>,
}

impl RestApiEvent {
    /// First non-empty of the multi-value parameters, the single-value
    /// parameters, and the generic `query` field.
    fn query_params(&self) -> Vec<(String, Vec<String>)> {
        if let Some(params) = non_empty(&self.multi_value_query_string_parameters) {
            return params.to_vec();
        }
        if let Some(params) = non_empty(&self.query_string_parameters) {
            return params
                .iter()
                .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
                .collect();
        }
        if let Some(params) = non_empty(&self.query) {
            return params.to_vec();
        }
        Vec::new()
    }
}

fn non_empty<T>(params: &Option<Vec<T>>) -> Option<&[T]> {
    params.as_deref().filter(|p| !p.is_empty())
}

impl PayloadRules for RestApiEvent {
    fn method(&self) -> &str {
        self.http_method.as_deref().unwrap_or("")
    }

    fn raw_path(&self) -> &str {
        &self.path
    }

    fn query_string(&self, load_balancer: bool) -> String {
        let params = self.query_params();
        encode_query(
            params.iter().map(|(k, v)| (k.as_str(), v.as_slice())),
            load_balancer,
        )
    }

    fn remote_addr(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|c| c.identity.as_ref())
            .and_then(|i| i.source_ip.as_deref())
            .unwrap_or("")
    }
}

// =============================================================================
// Fields shared by every format
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommonFields {
    body: Option<Value>,
    is_base64_encoded: Option<bool>,
    #[serde(default, deserialize_with = "fields::single_map")]
    headers: Option<Vec<(String, Option<String>)>>,
    #[serde(default, deserialize_with = "fields::multi_map")]
    multi_value_headers: Option<Vec<(String, Vec<String>)>>,
    request_context: Option<CommonRequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CommonRequestContext {
    stage: Option<String>,
    authorizer: Option<Value>,
    elb: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum EventShape {
    HttpApi(HttpApiEvent),
    RestApi(RestApiEvent),
}

/// A parsed inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    raw: Value,
    format: PayloadFormat,
    shape: EventShape,
    common: CommonFields,
}

impl InboundEvent {
    /// Detect the payload format and parse the fields it defines.
    pub fn from_value(raw: Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(Error::malformed_event("event must be a JSON object"));
        }

        let format = PayloadFormat::detect(&raw);
        let shape = match format {
            PayloadFormat::V2 => EventShape::HttpApi(parse_part(&raw, format)?),
            PayloadFormat::V1 | PayloadFormat::Unversioned => {
                EventShape::RestApi(parse_part(&raw, format)?)
            }
        };
        let common = parse_part(&raw, format)?;

        Ok(Self {
            raw,
            format,
            shape,
            common,
        })
    }

    /// Parse an event from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::malformed_event(format!("invalid JSON: {e}")))?;
        Self::from_value(raw)
    }

    fn rules(&self) -> &dyn PayloadRules {
        match &self.shape {
            EventShape::HttpApi(event) => event as &dyn PayloadRules,
            EventShape::RestApi(event) => event as &dyn PayloadRules,
        }
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// `true` when the event came through a load balancer target group.
    pub fn is_load_balancer(&self) -> bool {
        self.request_context()
            .and_then(|c| c.elb.as_ref())
            .is_some_and(|elb| !elb.is_null())
    }

    /// `true` when the event carries a `multiValueHeaders` map; the response
    /// must then answer with one as well.
    pub fn has_multi_value_headers(&self) -> bool {
        self.common.multi_value_headers.is_some()
    }

    pub fn method(&self) -> &str {
        self.rules().method()
    }

    /// Percent-decoded request path.
    pub fn path(&self) -> String {
        decode_path(self.rules().raw_path())
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.rules().query_string(self.is_load_balancer())
    }

    pub fn remote_addr(&self) -> &str {
        self.rules().remote_addr()
    }

    /// Headers folded into one multi-valued collection.
    ///
    /// Prefers `multiValueHeaders` over `headers`. Cookies that payload 2.0
    /// moves into a separate array are put back as a `Cookie` header unless
    /// one is already present.
    pub fn headers(&self) -> MultiValuedHeaders {
        let mut headers = match (&self.common.multi_value_headers, &self.common.headers) {
            (Some(multi), _) => MultiValuedHeaders::from_multi(multi.iter().cloned()),
            (None, Some(single)) => single
                .iter()
                .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
                .collect(),
            (None, None) => MultiValuedHeaders::new(),
        };

        let cookies = self.rules().cookies();
        if !cookies.is_empty() && !headers.contains("Cookie") {
            headers.append("Cookie", cookies.join("; "));
        }
        headers
    }

    /// Recovered request body bytes.
    pub fn body(&self) -> Result<Bytes> {
        recover_body(
            self.common.body.as_ref(),
            self.common.is_base64_encoded.unwrap_or(false),
        )
    }

    /// Deployment stage from the request context, if any.
    pub fn stage(&self) -> Option<&str> {
        self.request_context().and_then(|c| c.stage.as_deref())
    }

    /// Raw authorizer block from the request context.
    pub fn authorizer(&self) -> Option<&Value> {
        self.request_context()
            .and_then(|c| c.authorizer.as_ref())
            .filter(|a| !a.is_null())
    }

    /// Principal the authorizer attached, or `""`.
    pub fn principal_id(&self) -> &str {
        self.authorizer()
            .and_then(|a| a.get("principalId"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// The event exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn request_context(&self) -> Option<&CommonRequestContext> {
        self.common.request_context.as_ref()
    }
}

fn parse_part<'de, T: Deserialize<'de>>(raw: &'de Value, format: PayloadFormat) -> Result<T> {
    T::deserialize(raw)
        .map_err(|e| Error::malformed_event(format!("payload format {format}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v2_event() -> Value {
        json!({
            "version": "2.0",
            "rawPath": "/my%20path",
            "rawQueryString": "a=1&b=two%20words",
            "cookies": ["c1=v1", "c2=v2"],
            "headers": {"Host": "example.com", "X-Forwarded-Proto": "https"},
            "requestContext": {
                "http": {"method": "PUT", "path": "/my path", "sourceIp": "10.0.0.1"},
                "stage": "$default"
            },
            "body": "hi",
            "isBase64Encoded": false
        })
    }

    fn rest_event() -> Value {
        json!({
            "version": "1.0",
            "httpMethod": "GET",
            "path": "/users/42",
            "headers": {"Host": "example.com"},
            "multiValueHeaders": {"Host": ["example.com"], "Accept": ["a", "b"]},
            "queryStringParameters": {"tag": "b"},
            "multiValueQueryStringParameters": {"tag": ["a", "b"]},
            "requestContext": {
                "identity": {"sourceIp": "192.168.1.1"},
                "authorizer": {"principalId": "user-7"}
            }
        })
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(PayloadFormat::detect(&json!({"version": "2.0"})), PayloadFormat::V2);
        assert_eq!(PayloadFormat::detect(&json!({"version": "1.0"})), PayloadFormat::V1);
        assert_eq!(PayloadFormat::detect(&json!({"version": "9.9"})), PayloadFormat::Unversioned);
        assert_eq!(PayloadFormat::detect(&json!({"version": 2})), PayloadFormat::Unversioned);
        assert_eq!(PayloadFormat::detect(&json!({})), PayloadFormat::Unversioned);
    }

    #[test]
    fn test_v2_fields() {
        let event = InboundEvent::from_value(v2_event()).unwrap();
        assert_eq!(event.format(), PayloadFormat::V2);
        assert_eq!(event.method(), "PUT");
        assert_eq!(event.path(), "/my path");
        assert_eq!(event.query_string(), "a=1&b=two%20words");
        assert_eq!(event.remote_addr(), "10.0.0.1");
        assert!(!event.has_multi_value_headers());
        assert!(!event.is_load_balancer());
        assert_eq!(event.body().unwrap().as_ref(), b"hi");
    }

    #[test]
    fn test_v2_cookies_become_header() {
        let event = InboundEvent::from_value(v2_event()).unwrap();
        let headers = event.headers();
        assert_eq!(headers.get("cookie"), Some("c1=v1; c2=v2"));
    }

    #[test]
    fn test_v2_existing_cookie_header_wins() {
        let mut raw = v2_event();
        raw["headers"]["cookie"] = json!("mine=1");
        let event = InboundEvent::from_value(raw).unwrap();
        assert_eq!(event.headers().get_all("Cookie"), vec!["mine=1"]);
    }

    #[test]
    fn test_rest_fields() {
        let event = InboundEvent::from_value(rest_event()).unwrap();
        assert_eq!(event.format(), PayloadFormat::V1);
        assert_eq!(event.method(), "GET");
        assert_eq!(event.path(), "/users/42");
        assert_eq!(event.query_string(), "tag=a&tag=b");
        assert_eq!(event.remote_addr(), "192.168.1.1");
        assert_eq!(event.principal_id(), "user-7");
        assert!(event.has_multi_value_headers());
        assert_eq!(event.headers().get_all("accept"), vec!["a", "b"]);
    }

    #[test]
    fn test_query_fallback_chain() {
        let mut raw = rest_event();
        raw["multiValueQueryStringParameters"] = json!({});
        let event = InboundEvent::from_value(raw.clone()).unwrap();
        assert_eq!(event.query_string(), "tag=b");

        raw["queryStringParameters"] = Value::Null;
        raw["query"] = json!({"q": "x"});
        let event = InboundEvent::from_value(raw.clone()).unwrap();
        assert_eq!(event.query_string(), "q=x");

        raw["query"] = Value::Null;
        let event = InboundEvent::from_value(raw).unwrap();
        assert_eq!(event.query_string(), "");
    }

    #[test]
    fn test_load_balancer_decodes_query() {
        let raw = json!({
            "httpMethod": "GET",
            "path": "/lb",
            "queryStringParameters": {"q": "a%20b"},
            "headers": {"host": "lb.example.com"},
            "requestContext": {"elb": {"targetGroupArn": "arn:aws:elasticloadbalancing:..."}}
        });
        let event = InboundEvent::from_value(raw).unwrap();
        assert_eq!(event.format(), PayloadFormat::Unversioned);
        assert!(event.is_load_balancer());
        assert_eq!(event.query_string(), "q=a+b");
    }

    #[test]
    fn test_missing_mandatory_path() {
        let err = InboundEvent::from_value(json!({"version": "2.0"})).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(ref m) if m.contains("rawPath")));

        let err = InboundEvent::from_value(json!({"httpMethod": "GET"})).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(ref m) if m.contains("path")));

        let err = InboundEvent::from_value(json!({"path": null})).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn test_non_object_event() {
        let err = InboundEvent::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
        let err = InboundEvent::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn test_wrongly_typed_field_is_malformed() {
        let err = InboundEvent::from_value(json!({"path": "/", "headers": ["x"]})).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn test_null_headers_are_empty() {
        let event =
            InboundEvent::from_value(json!({"path": "/", "headers": null, "body": null})).unwrap();
        assert!(event.headers().is_empty());
        assert!(event.body().unwrap().is_empty());
        assert_eq!(event.method(), "");
    }

    #[test]
    fn test_v2_ignores_rest_only_fields() {
        let mut raw = v2_event();
        raw["path"] = json!("/ignored");
        raw["httpMethod"] = json!("DELETE");
        raw["queryStringParameters"] = json!({"ignored": "1"});
        let event = InboundEvent::from_value(raw).unwrap();
        assert_eq!(event.method(), "PUT");
        assert_eq!(event.path(), "/my path");
        assert_eq!(event.query_string(), "a=1&b=two%20words");
    }
}
