use super::*;

use clap::Parser as _;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.listen_addr.port(), DEFAULT_PORT);
    assert_eq!(settings.cache.capacity.get(), DEFAULT_CACHE_CAPACITY);
    assert_eq!(settings.cache.local_ttl_secs.get(), DEFAULT_LOCAL_TTL_SECS);
    assert_eq!(settings.cache.remote_ttl_secs.get(), DEFAULT_REMOTE_TTL_SECS);
    assert_eq!(
        settings.cache.concurrency_limit.get(),
        DEFAULT_CONCURRENCY_LIMIT
    );
    assert_eq!(settings.remote.url, DEFAULT_REMOTE_URL);
    assert!(settings.remote.enabled);
    assert!(settings.registry.file.is_none());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = Overrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.listen_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = Overrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn remote_ttl_must_exceed_local_ttl() {
    let mut raw = RawSettings::default();
    raw.cache.local_ttl_secs = Some(600);
    raw.cache.remote_ttl_secs = Some(600);

    let error = Settings::from_raw(raw).expect_err("inverted hierarchy rejected");
    assert!(matches!(
        error,
        LoadError::Invalid {
            key: "cache.remote_ttl_secs",
            ..
        }
    ));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let error = Settings::from_raw(raw).expect_err("zero port rejected");
    assert!(matches!(error, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn zero_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.capacity = Some(0);

    let error = Settings::from_raw(raw).expect_err("zero capacity rejected");
    assert!(matches!(
        error,
        LoadError::Invalid {
            key: "cache.capacity",
            ..
        }
    ));
}

#[test]
fn parse_remote_toggle() {
    let args = CliArgs::parse_from(["favella", "--remote-enabled", "false"]);
    assert_eq!(args.overrides.remote_enabled, Some(false));

    let mut raw = RawSettings::default();
    raw.apply_overrides(&args.overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(!settings.remote.enabled);
}

#[test]
fn parse_registry_file_argument() {
    let args = CliArgs::parse_from(["favella", "--registry-file", "registry.toml"]);
    assert_eq!(
        args.overrides.registry_file.as_deref(),
        Some(std::path::Path::new("registry.toml"))
    );
}
