//! One invocation, end to end.
//!
//! ```text
//!   event ──► RequestTranslator ──► NormalizedRequest ──► Application
//!                                                            │
//!   envelope ◄── ResponseTranslator ◄──── Response ◄─────────┘
//! ```

use serde_json::Value;

use crate::context::InvocationContext;
use crate::event::InboundEvent;
use crate::request::{NormalizedRequest, RequestTranslator};
use crate::response::{OutboundEnvelope, Response, ResponseTranslator};
use crate::types::{Result, TranslationConfig};

/// A synchronous HTTP application.
pub trait Application {
    fn call(&self, request: NormalizedRequest) -> Response;
}

impl<F> Application for F
where
    F: Fn(NormalizedRequest) -> Response,
{
    fn call(&self, request: NormalizedRequest) -> Response {
        self(request)
    }
}

/// Runs an [`Application`] behind function events.
///
/// Holds no per-invocation state; one adapter serves every invocation of a
/// warm function instance.
#[derive(Debug)]
pub struct Adapter<A> {
    app: A,
    requests: RequestTranslator,
    responses: ResponseTranslator,
}

impl<A: Application> Adapter<A> {
    pub fn new(app: A, config: TranslationConfig) -> Self {
        Self {
            app,
            requests: RequestTranslator::new(config),
            responses: ResponseTranslator::new(),
        }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Translate the event, call the application once, translate its response.
    pub fn handle(&self, event: Value, context: &InvocationContext) -> Result<OutboundEnvelope> {
        let span = tracing::info_span!(
            "invocation",
            request_id = %context.aws_request_id,
            function = %context.function_name,
        );
        let _guard = span.enter();

        let event = InboundEvent::from_value(event).map_err(|e| {
            tracing::warn!("event_rejected: {}", e);
            e
        })?;
        let request = self.requests.translate(&event, context)?;
        let response = self.app.call(request);
        let envelope = self.responses.translate(&response, &event)?;

        tracing::debug!(
            format = %event.format(),
            status = envelope.status_code,
            "invocation_completed"
        );
        Ok(envelope)
    }

    /// Like [`handle`](Self::handle), returning the envelope as JSON.
    pub fn handle_json(&self, event: Value, context: &InvocationContext) -> Result<Value> {
        self.handle(event, context)?.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use std::cell::Cell;
    use std::io::Read;

    #[test]
    fn test_closure_application() {
        let adapter = Adapter::new(
            |mut request: NormalizedRequest| {
                let mut body = String::new();
                request.body_mut().read_to_string(&mut body).unwrap_or_default();
                Response::new(200)
                    .with_header("Content-Type", "text/plain")
                    .with_body(format!("{} {} {}", request.method(), request.path_info(), body))
            },
            TranslationConfig::default(),
        );

        let envelope = adapter
            .handle(
                json!({"httpMethod": "POST", "path": "/echo", "headers": {}, "body": "hi"}),
                &InvocationContext::default(),
            )
            .unwrap();

        assert_eq!(envelope.body.unwrap().body, "POST /echo hi");
    }

    struct CountingApp {
        calls: Cell<u32>,
    }

    impl Application for CountingApp {
        fn call(&self, _request: NormalizedRequest) -> Response {
            self.calls.set(self.calls.get() + 1);
            Response::new(204)
        }
    }

    #[test]
    fn test_application_called_once_per_invocation() {
        let adapter = Adapter::new(
            CountingApp {
                calls: Cell::new(0),
            },
            TranslationConfig::default(),
        );

        let ctx = InvocationContext::default();
        adapter.handle(json!({"path": "/"}), &ctx).unwrap();
        adapter.handle(json!({"path": "/"}), &ctx).unwrap();
        assert_eq!(adapter.app().calls.get(), 2);
    }

    #[test]
    fn test_malformed_event_skips_application() {
        let adapter = Adapter::new(
            CountingApp {
                calls: Cell::new(0),
            },
            TranslationConfig::default(),
        );

        let err = adapter
            .handle(json!({"version": "2.0"}), &InvocationContext::default())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
        assert_eq!(adapter.app().calls.get(), 0);
    }

    #[test]
    fn test_handle_json() {
        let adapter = Adapter::new(
            |_request: NormalizedRequest| Response::new(200).with_body("ok"),
            TranslationConfig::default(),
        );

        let value = adapter
            .handle_json(
                json!({"path": "/", "multiValueHeaders": {}}),
                &InvocationContext::default(),
            )
            .unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "multiValueHeaders": {},
                "body": "ok",
                "isBase64Encoded": false
            })
        );
    }
}
