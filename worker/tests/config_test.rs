use std::time::Duration;
use vod_pipeline_worker::config::Config;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_metrics_port() {
    let mut config = Config::default();
    config.server.metrics_port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_database_url() {
    let mut config = Config::default();
    config.database.url = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_database_connections() {
    let mut config = Config::default();
    config.database.min_connections = 10;
    config.database.max_connections = 5;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_object_store_endpoint() {
    let mut config = Config::default();
    config.object_store.endpoint = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_broker_url() {
    let mut config = Config::default();
    config.broker.url = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_ladder_is_invalid() {
    let mut config = Config::default();
    config.ladder.entries = vec![];
    assert!(config.validate().is_err());
}

#[test]
fn test_duration_conversions() {
    let config = Config::default();
    assert_eq!(
        config.database_connection_timeout(),
        Duration::from_secs(30)
    );
    assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    assert_eq!(config.presigned_url_expiry(), Duration::from_secs(3600));
}

#[test]
fn test_reference_ladder_covers_standard_qualities() {
    let config = Config::default();
    let labels = config.ladder.labels();
    for expected in ["1080p", "720p", "480p", "360p", "240p", "144p"] {
        assert!(labels.contains(&expected.to_string()));
    }
}
