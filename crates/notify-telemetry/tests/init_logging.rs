//! Global subscriber installation. Kept to a single test so the process-wide
//! subscriber is installed exactly once in this binary.

use notify_telemetry::{init_logging, TelemetryConfig, TelemetryError};

#[test]
fn test_second_init_reports_already_initialized() {
    let config = TelemetryConfig {
        console_output: false,
        ..TelemetryConfig::default()
    }
    .for_service("init-test");

    let guard = init_logging(&config).expect("first install succeeds");
    assert_eq!(guard.service_name(), "init-test");

    let second = init_logging(&config);
    assert!(matches!(second, Err(TelemetryError::AlreadyInitialized(_))));
}
