//! # Lambda Bridge - function events to synchronous HTTP
//!
//! Runs a synchronous HTTP application behind a function platform that
//! delivers requests as JSON events instead of sockets:
//! - Payload format detection (HTTP API 2.0, REST API 1.0, unversioned / load balancer)
//! - Header folding with case-insensitive lookup and repeated values
//! - Body recovery (base64 or text) and re-encoding by MIME type
//! - Query string reconstruction, including load balancer decoding
//! - Envelope header shape mirroring, with case-permuted repeated headers
//!
//! ## Architecture
//!
//! ```text
//!   event JSON ─► InboundEvent ─► RequestTranslator ─► NormalizedRequest
//!                                                            │
//!                                                       Application
//!                                                            │
//!   envelope JSON ◄─ OutboundEnvelope ◄─ ResponseTranslator ◄─ Response
//! ```
//!
//! Every translation is a pure function of (event, context, config); nothing
//! is kept between invocations.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod context;
pub mod event;
pub mod headers;
pub mod request;
pub mod response;
pub mod types;

// Internal utilities
pub mod observability;

pub use adapter::{Adapter, Application};
pub use context::InvocationContext;
pub use event::{InboundEvent, PayloadFormat};
pub use headers::MultiValuedHeaders;
pub use request::{Body, NormalizedRequest, RequestTranslator};
pub use response::{OutboundEnvelope, Response, ResponseTranslator};
pub use types::{Config, Error, Result, TranslationConfig};
