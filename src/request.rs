//! Event → normalized request translation.
//!
//! The normalized request is what a synchronous HTTP application consumes:
//! CGI-style request metadata, the folded headers, a body stream, plus the
//! untouched event and invocation attributes for applications that need to
//! look past HTTP.

use std::collections::BTreeMap;
use std::io::{self, Read};

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::context::InvocationContext;
use crate::event::{InboundEvent, PayloadFormat};
use crate::headers::MultiValuedHeaders;
use crate::types::{Result, TranslationConfig};

/// Host suffix of managed gateway endpoints, which prefix paths with the stage.
pub const GATEWAY_DOMAIN: &str = "amazonaws.com";

/// Server name used when the request has no `Host` header.
pub const DEFAULT_SERVER_NAME: &str = "lambda";

/// Port used when the request has no `X-Forwarded-Port` header.
pub const DEFAULT_SERVER_PORT: &str = "80";

/// Scheme used when the request has no `X-Forwarded-Proto` header.
pub const DEFAULT_URL_SCHEME: &str = "http";

pub const SERVER_PROTOCOL: &str = "HTTP/1.1";

/// Request body, readable once.
///
/// Reading drains the buffer; once consumed, further reads return 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    remaining: Bytes,
}

impl Body {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            remaining: bytes.into(),
        }
    }

    /// Bytes not yet read.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Take everything not yet read, leaving the body empty.
    pub fn take_bytes(&mut self) -> Bytes {
        std::mem::take(&mut self.remaining)
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining.len());
        let chunk = self.remaining.split_to(n);
        buf[..n].copy_from_slice(&chunk);
        Ok(n)
    }
}

/// A request in the shape a synchronous HTTP application expects.
#[derive(Debug, PartialEq)]
pub struct NormalizedRequest {
    method: String,
    script_name: String,
    path_info: String,
    query_string: String,
    content_type: String,
    content_length: usize,
    remote_addr: String,
    remote_user: String,
    server_name: String,
    server_port: String,
    url_scheme: String,
    headers: MultiValuedHeaders,
    body: Body,
    format: PayloadFormat,
    load_balancer: bool,
    authorizer: Option<Value>,
    event: Value,
    context: Map<String, Value>,
}

impl NormalizedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Stage prefix the application is mounted under (`""` or `/<stage>`).
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Percent-decoded path.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Authorizer principal, or `""`.
    pub fn remote_user(&self) -> &str {
        &self.remote_user
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_port(&self) -> &str {
        &self.server_port
    }

    pub fn server_protocol(&self) -> &str {
        SERVER_PROTOCOL
    }

    pub fn url_scheme(&self) -> &str {
        &self.url_scheme
    }

    pub fn headers(&self) -> &MultiValuedHeaders {
        &self.headers
    }

    /// The body stream. Reading it consumes it.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn is_load_balancer(&self) -> bool {
        self.load_balancer
    }

    /// Raw authorizer block of the request context.
    pub fn authorizer(&self) -> Option<&Value> {
        self.authorizer.as_ref()
    }

    /// The event as received from the platform.
    pub fn event(&self) -> &Value {
        &self.event
    }

    /// Flattened invocation attributes.
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// `script_name + path_info`, plus `?query` when there is one.
    pub fn uri(&self) -> String {
        let mut uri = format!("{}{}", self.script_name, self.path_info);
        if !self.query_string.is_empty() {
            uri.push('?');
            uri.push_str(&self.query_string);
        }
        uri
    }

    /// CGI-style variables.
    ///
    /// Every header except `Content-Type`/`Content-Length` appears as
    /// `HTTP_<NAME>` (uppercased, `-` → `_`); repeated values are joined
    /// with `,`.
    pub fn environ(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("REQUEST_METHOD".to_string(), self.method.clone());
        env.insert("SCRIPT_NAME".to_string(), self.script_name.clone());
        env.insert("PATH_INFO".to_string(), self.path_info.clone());
        env.insert("QUERY_STRING".to_string(), self.query_string.clone());
        env.insert("CONTENT_TYPE".to_string(), self.content_type.clone());
        env.insert("CONTENT_LENGTH".to_string(), self.content_length.to_string());
        env.insert("REMOTE_ADDR".to_string(), self.remote_addr.clone());
        env.insert("REMOTE_USER".to_string(), self.remote_user.clone());
        env.insert("SERVER_NAME".to_string(), self.server_name.clone());
        env.insert("SERVER_PORT".to_string(), self.server_port.clone());
        env.insert("SERVER_PROTOCOL".to_string(), SERVER_PROTOCOL.to_string());
        env.insert("URL_SCHEME".to_string(), self.url_scheme.clone());

        for (name, values) in self.headers.grouped() {
            if name.eq_ignore_ascii_case("content-type")
                || name.eq_ignore_ascii_case("content-length")
            {
                continue;
            }
            let key = format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"));
            env.insert(key, values.join(","));
        }
        env
    }
}

/// Builds [`NormalizedRequest`]s from inbound events.
#[derive(Debug, Clone, Default)]
pub struct RequestTranslator {
    config: TranslationConfig,
}

impl RequestTranslator {
    pub fn new(config: TranslationConfig) -> Self {
        Self { config }
    }

    /// Parse and translate a raw JSON event.
    pub fn translate_value(
        &self,
        event: Value,
        context: &InvocationContext,
    ) -> Result<NormalizedRequest> {
        let event = InboundEvent::from_value(event)?;
        self.translate(&event, context)
    }

    /// Translate a parsed event.
    ///
    /// Pure: the same event, context and configuration always give an equal
    /// request.
    pub fn translate(
        &self,
        event: &InboundEvent,
        context: &InvocationContext,
    ) -> Result<NormalizedRequest> {
        let body = event.body()?;
        let headers = event.headers();
        let script_name = self.script_name(&headers, event.stage());

        let header_or = |name: &str, default: &str| -> String {
            headers.get(name).unwrap_or(default).to_string()
        };

        let request = NormalizedRequest {
            method: event.method().to_string(),
            script_name,
            path_info: event.path(),
            query_string: event.query_string(),
            content_type: header_or("Content-Type", ""),
            content_length: body.len(),
            remote_addr: event.remote_addr().to_string(),
            remote_user: event.principal_id().to_string(),
            server_name: header_or("Host", DEFAULT_SERVER_NAME),
            server_port: header_or("X-Forwarded-Port", DEFAULT_SERVER_PORT),
            url_scheme: header_or("X-Forwarded-Proto", DEFAULT_URL_SCHEME),
            body: Body::new(body),
            format: event.format(),
            load_balancer: event.is_load_balancer(),
            authorizer: event.authorizer().cloned(),
            event: event.raw().clone(),
            context: context.to_attributes(),
            headers,
        };

        tracing::debug!(
            format = %request.format,
            method = %request.method,
            path = %request.path_info,
            content_length = request.content_length,
            "request_translated"
        );

        Ok(request)
    }

    /// Base path: `/<stage>` for requests addressed to a managed gateway
    /// hostname, unless stage stripping is enabled; `""` otherwise.
    pub fn script_name(&self, headers: &MultiValuedHeaders, stage: Option<&str>) -> String {
        let via_gateway = headers
            .get("Host")
            .is_some_and(|host| host.contains(GATEWAY_DOMAIN));

        if via_gateway && !self.config.strip_stage_path {
            format!("/{}", stage.unwrap_or(""))
        } else {
            String::new()
        }
    }
}
