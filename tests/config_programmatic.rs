//! Integration test for programmatic configuration
//!
//! Tests that inputs can be configured entirely in code or from TOML text.

use queue_input_core::{Codec, DataType, InputConfig, Password};
use std::time::Duration;

#[test]
fn test_programmatic_input_config() {
    let config = InputConfig {
        host: "queue.internal".to_string(),
        port: 6380,
        db: 2,
        timeout: 10,
        password: Some(Password::new("s3cret")),
        key: "logstash-apache".to_string(),
        data_type: DataType::List,
        retries: 8,
        name: "apache-input".to_string(),
        format: Codec::Plain,
        retry_backoff_ms: 500,
        log_level: "debug".to_string(),
    };

    assert!(config.validate().is_ok());
    assert_eq!(config.identity(), "queue.internal:6380/2 list:logstash-apache");

    let options = config.connect_options();
    assert_eq!(options.host, "queue.internal");
    assert_eq!(options.port, 6380);
    assert_eq!(options.db, 2);
    assert_eq!(options.timeout, Duration::from_secs(10));
    assert_eq!(options.password.as_ref().map(Password::expose), Some("s3cret"));
    assert_eq!(config.retry_backoff(), Duration::from_millis(500));
}

#[test]
fn test_config_from_toml_with_defaults() {
    let config = InputConfig::from_toml(
        r#"
        key = "events"
        data_type = "channel"
        "#,
    )
    .expect("minimal config should parse");

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 6379);
    assert_eq!(config.db, 0);
    assert_eq!(config.timeout, 5);
    assert!(config.password.is_none());
    assert_eq!(config.data_type, DataType::Channel);
    assert_eq!(config.retries, 5);
    assert_eq!(config.format, Codec::Json);
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_config_from_toml_full() {
    let config = InputConfig::from_toml(
        r#"
        host = "10.1.2.3"
        port = 7000
        db = 4
        timeout = 2
        password = "pw"
        key = "jobs"
        dataType = "list"
        retries = 0
        format = "plain"
        retry_backoff_ms = 100
        "#,
    )
    .expect("full config should parse");

    assert_eq!(config.host, "10.1.2.3");
    assert_eq!(config.port, 7000);
    assert_eq!(config.db, 4);
    assert_eq!(config.password, Some(Password::new("pw")));
    assert_eq!(config.data_type, DataType::List);
    assert_eq!(config.retries, 0);
    assert_eq!(config.format, Codec::Plain);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_unknown_data_type() {
    let result = InputConfig::from_toml(
        r#"
        key = "jobs"
        data_type = "stream"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_config_missing_file() {
    let err = InputConfig::from_file("/nonexistent/queue-input.toml").unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_password_is_redacted() {
    let mut config = InputConfig::new("jobs", DataType::List);
    config.password = Some(Password::new("do-not-log"));

    let debug = format!("{:?}", config);
    assert!(!debug.contains("do-not-log"));
    assert!(debug.contains("<redacted>"));
    assert!(!config.identity().contains("do-not-log"));
}
