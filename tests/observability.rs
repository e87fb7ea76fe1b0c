//! Subscriber installation runs in its own test binary so it never races the
//! capturing subscribers of the unit tests.

use lambda_bridge::observability::init_tracing;
use lambda_bridge::types::ObservabilityConfig;

#[test]
fn test_init_tracing_is_idempotent() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        json_logs: true,
    };

    init_tracing(&config);
    init_tracing(&ObservabilityConfig::default());

    tracing::info!("tracing_initialized");
}
