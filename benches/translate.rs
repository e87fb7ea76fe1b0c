//! Translation throughput benchmark.
//!
//! Measures event → request and response → envelope latency across body
//! sizes using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lambda_bridge::{
    InboundEvent, InvocationContext, RequestTranslator, Response, ResponseTranslator,
    TranslationConfig,
};
use serde_json::{json, Value};

const BODY_SIZES: &[usize] = &[0, 64, 1024, 65536];

fn rest_event(body_size: usize) -> Value {
    json!({
        "httpMethod": "POST",
        "path": "/items/42",
        "multiValueHeaders": {
            "Host": ["abcd.execute-api.us-east-1.amazonaws.com"],
            "Content-Type": ["text/plain"],
            "Accept": ["text/html", "application/json"]
        },
        "multiValueQueryStringParameters": {"tag": ["a", "b"], "page": ["2"]},
        "requestContext": {"stage": "dev", "identity": {"sourceIp": "10.0.0.1"}},
        "body": "x".repeat(body_size),
        "isBase64Encoded": false
    })
}

fn bench_request(c: &mut Criterion) {
    let translator = RequestTranslator::new(TranslationConfig::default());
    let context = InvocationContext::default();

    let mut group = c.benchmark_group("request_translate");
    for &size in BODY_SIZES {
        let event = InboundEvent::from_value(rest_event(size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &event, |b, e| {
            b.iter(|| translator.translate(black_box(e), &context).unwrap());
        });
    }
    group.finish();
}

fn bench_response(c: &mut Criterion) {
    let translator = ResponseTranslator::new();
    let event = InboundEvent::from_value(json!({
        "version": "2.0",
        "rawPath": "/",
        "headers": {"host": "api.example.com"},
        "requestContext": {"http": {"method": "GET"}}
    }))
    .unwrap();

    let mut group = c.benchmark_group("response_translate");
    for &size in BODY_SIZES {
        let response = Response::new(200)
            .with_header("Content-Type", "application/octet-stream")
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2")
            .with_body(vec![0xABu8; size]);
        group.bench_with_input(BenchmarkId::from_parameter(size), &response, |b, r| {
            b.iter(|| translator.translate(black_box(r), &event).unwrap());
        });
    }
    group.finish();
}

fn bench_parse_event(c: &mut Criterion) {
    let bytes = serde_json::to_vec(&rest_event(1024)).unwrap();

    c.bench_function("parse_event_1kb", |b| {
        b.iter(|| InboundEvent::from_slice(black_box(&bytes)).unwrap());
    });
}

criterion_group!(benches, bench_request, bench_response, bench_parse_event);
criterion_main!(benches);
