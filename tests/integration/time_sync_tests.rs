//! Integration tests for TimeSynchronizer: fetch → parse → set clock.

use std::cell::Cell;
use std::rc::Rc;

use netclock::app::ports::{HardwareClock, RequestOptions, Response};
use netclock::app::{ConnectivityManager, PixelStatus, TimeReading, TimeSynchronizer};
use netclock::config::SyncConfig;
use netclock::error::{ClockError, Error, HttpError, LinkError, Operation, PayloadError};

use crate::mock_hw::{
    bounded_config, creds, manager, synchronizer, MockClock, MockHttp, MockRadio, RecordingStatus, REFERENCE_PAYLOAD,
    REFERENCE_READING,
};

// ── get_time ──────────────────────────────────────────────────

#[test]
fn reference_payload_sets_clock() {
    let http = MockHttp::with([MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    let reading = sync.get_time().unwrap();

    assert_eq!(reading, REFERENCE_READING);
    assert_eq!(sync.clock().writes, vec![REFERENCE_READING]);
    assert_eq!(sync.clock().datetime(), Ok(REFERENCE_READING));
}

#[test]
fn requests_configured_url_with_timeout() {
    let config = SyncConfig {
        time_api_url: "http://192.168.1.10:8080/api/ip".into(),
        request_timeout_ms: 2_500,
        ..SyncConfig::default()
    };
    let http = MockHttp::with([MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &config);
    sync.get_time().unwrap();

    let (url, options) = &sync.http().requests[0];
    assert_eq!(url, "http://192.168.1.10:8080/api/ip");
    assert_eq!(options.timeout_ms, Some(2_500));
}

#[test]
fn repeated_sync_is_idempotent() {
    let http = MockHttp::with([MockHttp::ok(REFERENCE_PAYLOAD), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    let first = sync.get_time().unwrap();
    let second = sync.get_time().unwrap();

    assert_eq!(first, second);
    assert_eq!(sync.clock().writes, vec![REFERENCE_READING, REFERENCE_READING]);
}

#[test]
fn transport_error_then_success_matches_clean_run() {
    let http = MockHttp::with([Err(HttpError::Timeout), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    assert_eq!(sync.get_time().unwrap(), REFERENCE_READING);
    assert_eq!(sync.http().requests.len(), 2);
    assert_eq!(sync.clock().writes.len(), 1);
}

#[test]
fn not_ok_transport_error_is_retried() {
    let http = MockHttp::with([Err(HttpError::NotOk), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    assert_eq!(sync.get_time().unwrap(), REFERENCE_READING);
    assert_eq!(sync.http().requests.len(), 2);
    assert_eq!(sync.clock().writes, vec![REFERENCE_READING]);
}

#[test]
fn utc_payload_with_minimal_fields_sets_clock() {
    let body = r#"{"datetime": "2023-06-15T08:30:45.123456+00:00", "day_of_year": 166, "day_of_week": 4, "dst": false}"#;
    let http = MockHttp::with([MockHttp::ok(body)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    let expected = TimeReading {
        is_dst: false,
        ..REFERENCE_READING
    };
    assert_eq!(sync.get_time().unwrap(), expected);
    assert_eq!(sync.clock().writes, vec![expected]);
    assert_eq!(sync.http().requests.len(), 1);
}

#[test]
fn non_2xx_response_is_retried() {
    let http = MockHttp::with([
        Ok(Response::new(503, "busy")),
        Ok(Response::new(429, "")),
        MockHttp::ok(REFERENCE_PAYLOAD),
    ]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    assert_eq!(sync.get_time().unwrap(), REFERENCE_READING);
    assert_eq!(sync.http().requests.len(), 3);
}

#[test]
fn zulu_datetime_without_fraction() {
    let body = r#"{"datetime":"2024-02-29T23:59:60Z","day_of_year":60,"day_of_week":4,"dst":false}"#;
    let http = MockHttp::with([MockHttp::ok(body)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    let r = sync.get_time().unwrap();
    assert_eq!((r.year, r.month, r.day), (2024, 2, 29));
    assert_eq!((r.hour, r.minute, r.second), (23, 59, 60));
    assert_eq!((r.day_of_year, r.day_of_week, r.is_dst), (60, 4, false));
}

#[test]
fn fetch_gives_up_under_limited_policy() {
    let mut sync = synchronizer(MockRadio::associated(), MockHttp::new(), &bounded_config(4));

    assert_eq!(
        sync.get_time(),
        Err(Error::RetriesExhausted {
            operation: Operation::FetchTime,
            attempts: 4
        })
    );
    assert_eq!(sync.http().requests.len(), 4);
    assert!(sync.clock().writes.is_empty());
}

// ── Malformed payloads fail closed ────────────────────────────

/// Run one sync against `body`, returning the result and every clock write.
fn sync_once(body: &str) -> (Result<TimeReading, Error>, Vec<TimeReading>) {
    let http = MockHttp::with([MockHttp::ok(body)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());
    let result = sync.get_time();
    (result, sync.clock().writes.clone())
}

#[test]
fn missing_field_leaves_clock_untouched() {
    let (result, writes) = sync_once(r#"{"datetime":"2023-06-15T08:30:45","day_of_week":4,"dst":true}"#);
    assert_eq!(result, Err(Error::Payload(PayloadError::MissingField("day_of_year"))));
    assert!(writes.is_empty());
}

#[test]
fn non_numeric_component_leaves_clock_untouched() {
    let (result, writes) = sync_once(r#"{"datetime":"2023-Jun-15T08:30:45","day_of_year":166,"day_of_week":4,"dst":true}"#);
    assert!(matches!(result, Err(Error::Payload(PayloadError::NotNumeric(_)))));
    assert!(writes.is_empty());
}

#[test]
fn out_of_range_value_leaves_clock_untouched() {
    let (result, writes) = sync_once(r#"{"datetime":"2023-13-15T08:30:45","day_of_year":166,"day_of_week":4,"dst":true}"#);
    assert_eq!(result, Err(Error::Payload(PayloadError::OutOfRange("month"))));
    assert!(writes.is_empty());
}

#[test]
fn body_that_is_not_json_is_not_retried() {
    let http = MockHttp::with([MockHttp::ok("<html>captive portal</html>"), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    assert_eq!(sync.get_time(), Err(Error::Payload(PayloadError::Json)));
    assert_eq!(sync.http().requests.len(), 1);
    assert!(sync.clock().writes.is_empty());
}

#[test]
fn clock_rejection_is_reported() {
    let http = MockHttp::with([MockHttp::ok(REFERENCE_PAYLOAD)]);
    let clock = MockClock {
        writes: Vec::new(),
        fail_with: Some(ClockError::Platform),
    };
    let config = SyncConfig::default();
    let mut sync = TimeSynchronizer::new(manager(MockRadio::associated(), &config), http, clock, &config);

    assert_eq!(sync.get_time(), Err(Error::Clock(ClockError::Platform)));
}

// ── authenticated_get ─────────────────────────────────────────

#[test]
fn authenticated_get_connects_once_when_down() {
    let http = MockHttp::with([MockHttp::ok("{}")]);
    let mut sync = synchronizer(MockRadio::new(), http, &SyncConfig::default());

    let response = sync
        .authenticated_get("http://example.com/", &RequestOptions::default())
        .unwrap();

    assert_eq!(response.body, b"{}");
    assert_eq!(sync.link().driver().connects, 1);
}

#[test]
fn authenticated_get_skips_connect_when_up() {
    let http = MockHttp::with([MockHttp::ok("{}")]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    sync.authenticated_get("http://example.com/", &RequestOptions::default())
        .unwrap();

    assert_eq!(sync.link().driver().connects, 0);
}

#[test]
fn authenticated_get_forwards_options_and_non_2xx() {
    let http = MockHttp::with([Ok(Response::new(404, "nope"))]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());
    let options = RequestOptions::with_timeout(1_000).header("X-AIO-Key", "secret");

    let response = sync.authenticated_get("http://example.com/feeds", &options).unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(sync.http().requests[0].1, options);
}

#[test]
fn authenticated_get_propagates_transport_error() {
    let http = MockHttp::with([Err(HttpError::Connect)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    assert_eq!(
        sync.authenticated_get("http://example.com/", &RequestOptions::default()),
        Err(Error::Http(HttpError::Connect))
    );
}

// ── Status indicator ──────────────────────────────────────────

#[test]
fn status_is_idle_after_construction() {
    let sync = synchronizer(MockRadio::associated(), MockHttp::new(), &SyncConfig::default());
    assert_eq!(sync.link().status().history, vec![PixelStatus::IDLE]);
}

#[test]
fn status_sequence_for_cold_request() {
    let http = MockHttp::with([MockHttp::ok("{}")]);
    let mut sync = synchronizer(MockRadio::new(), http, &SyncConfig::default());
    sync.authenticated_get("http://example.com/", &RequestOptions::default())
        .unwrap();

    assert_eq!(
        sync.link().status().history,
        vec![
            PixelStatus::IDLE,
            PixelStatus::CONNECTING,
            PixelStatus::CONNECTED,
            PixelStatus::BUSY,
            PixelStatus::IDLE,
        ]
    );
}

#[test]
fn status_returns_to_idle_after_transport_failure() {
    let http = MockHttp::with([Err(HttpError::Io)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());
    let _ = sync.authenticated_get("http://example.com/", &RequestOptions::default());

    assert_eq!(
        sync.link().status().history,
        vec![PixelStatus::IDLE, PixelStatus::BUSY, PixelStatus::IDLE]
    );
}

// ── Link loss during sync ─────────────────────────────────────

#[test]
fn link_drop_between_syncs_reconnects() {
    let http = MockHttp::with([MockHttp::ok(REFERENCE_PAYLOAD), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = synchronizer(MockRadio::associated(), http, &SyncConfig::default());

    sync.get_time().unwrap();
    sync.link_mut().driver_mut().connected = false;
    sync.get_time().unwrap();

    assert_eq!(sync.link().driver().connects, 1);
    assert_eq!(sync.clock().writes.len(), 2);
}

#[test]
fn connect_exhaustion_surfaces_from_get_time() {
    let config = bounded_config(2);
    let mut sync = synchronizer(MockRadio::failing(5, LinkError::Timeout), MockHttp::new(), &config);

    assert_eq!(
        sync.get_time(),
        Err(Error::RetriesExhausted {
            operation: Operation::Connect,
            attempts: 2
        })
    );
    assert!(sync.http().requests.is_empty());
}

#[test]
fn heartbeat_runs_during_fetch_retries() {
    let beats = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&beats);
    let config = SyncConfig::default();
    let link = ConnectivityManager::with_status(MockRadio::associated(), creds(), RecordingStatus::default(), &config)
        .with_heartbeat(move || counter.set(counter.get() + 1));
    let http = MockHttp::with([Err(HttpError::Io), Err(HttpError::Timeout), MockHttp::ok(REFERENCE_PAYLOAD)]);
    let mut sync = TimeSynchronizer::new(link, http, MockClock::default(), &config);

    sync.get_time().unwrap();
    assert_eq!(beats.get(), 3);
}
