//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use crate::{
    AirwaveError,
    config::{Config, LogLevel, PlaybackConfig, SeekBeforeReady, default_stations},
    services::PlaybackError,
};

#[test]
fn config_default_ships_both_stations() {
    let config = Config::default();

    let ids: Vec<&str> = config.stations.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "cbcmusic"]);
    assert!(
        config
            .stations
            .iter()
            .all(|s| s.url.path().ends_with("master.m3u8"))
    );
}

#[test]
fn config_serialize_toml() {
    let config = Config::default();

    let toml_str = config.to_toml().unwrap();
    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[playback]"));
    assert!(toml_str.contains("[[stations]]"));
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [playback]
        tick_interval_ms = 250
        seek_before_ready = "queue"

        [[stations]]
        id = "jazz"
        name = "Jazz"
        url = "https://example.com/jazz/master.m3u8"
    "#;

    let config = Config::from_toml(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.playback.tick_interval(), Duration::from_millis(250));
    assert_eq!(config.playback.seek_before_ready, SeekBeforeReady::Queue);
    assert!(!config.playback.end_session_on_pause);
    assert_eq!(config.stations.len(), 1);
    assert_eq!(config.stations[0].name, "Jazz");
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = original.to_toml().unwrap();
    let deserialized = Config::from_toml(&toml_str).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.stations, default_stations());
}

#[test]
fn playback_defaults() {
    let playback = PlaybackConfig::default();

    assert_eq!(playback.tick_interval(), Duration::from_secs(1));
    assert_eq!(playback.seek_before_ready, SeekBeforeReady::Drop);
}

#[test]
fn zero_tick_interval_is_clamped() {
    let playback = PlaybackConfig {
        tick_interval_ms: 0,
        ..PlaybackConfig::default()
    };

    assert_eq!(playback.tick_interval(), Duration::from_millis(1));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let result = Config::from_toml("[general\nlog_level = ");

    match result {
        Err(AirwaveError::TomlParse(message)) => assert!(message.contains("Failed to parse TOML")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn invalid_station_url_is_rejected() {
    let toml_str = r#"
        [[stations]]
        id = "broken"
        name = "Broken"
        url = "not a url"
    "#;

    assert!(matches!(
        Config::from_toml(toml_str),
        Err(AirwaveError::TomlParse(_))
    ));
}

#[test]
fn duplicate_station_ids_are_rejected() {
    let toml_str = r#"
        [[stations]]
        id = "r1"
        name = "One"
        url = "https://example.com/a.m3u8"

        [[stations]]
        id = "r1"
        name = "Two"
        url = "https://example.com/b.m3u8"
    "#;

    assert!(matches!(
        Config::from_toml(toml_str),
        Err(AirwaveError::Config(_))
    ));
}

#[test]
fn station_lookup() {
    let config = Config::default();

    assert_eq!(config.station("cbcmusic").unwrap().name, "CBC Music");
    assert_eq!(
        config.station("nope"),
        Err(PlaybackError::UnknownStation("nope".to_string()))
    );
}

#[test]
fn resolve_accepts_station_ids_and_stream_urls() {
    let config = Config::default();

    assert_eq!(config.resolve("r1").unwrap().name, "CBC Radio One");

    let adhoc = config
        .resolve("https://radio.example.com/live/master.m3u8")
        .unwrap();
    assert_eq!(adhoc.id, "radio.example.com");
    assert_eq!(adhoc.url.path(), "/live/master.m3u8");
}

#[test]
fn resolve_rejects_unknown_ids_and_bad_urls() {
    let config = Config::default();

    assert_eq!(
        config.resolve("jazz"),
        Err(PlaybackError::UnknownStation("jazz".to_string()))
    );
    assert!(matches!(
        config.resolve("http://[::1/live.m3u8"),
        Err(PlaybackError::InvalidUrl(_))
    ));
}

#[test]
fn log_level_display_matches_serde_names() {
    for (level, name) in [
        (LogLevel::Error, "error"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Info, "info"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Trace, "trace"),
    ] {
        assert_eq!(level.to_string(), name);
    }
}
