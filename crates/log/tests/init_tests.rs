//! Integration tests for global logger installation

use keyturn_log::{Format, LogConfig, LogError, Writer};

/// Each integration test binary is a fresh process, so the first install wins
#[test]
fn test_second_install_is_rejected() {
    let config = LogConfig {
        level: "debug".to_string(),
        format: Format::Json,
        writer: Writer::Stderr,
        ..LogConfig::test()
    };

    let _guard = keyturn_log::init_with(config.clone()).unwrap();
    keyturn_log::info!(status = 200, "Rotation step completed");

    assert!(matches!(
        keyturn_log::init_with(config),
        Err(LogError::Init(_))
    ));
}
