//! End-to-end sync through the host adapters: simulated radio, std HTTP
//! client against a local server thread, simulated RTC.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

use netclock::adapters::http::HttpAdapter;
use netclock::adapters::rtc::RtcAdapter;
use netclock::adapters::wifi::WifiAdapter;
use netclock::app::ports::HardwareClock;
use netclock::app::{ConnectivityManager, TimeSynchronizer};
use netclock::config::SyncConfig;

use crate::mock_hw::{bounded_config, creds, REFERENCE_PAYLOAD, REFERENCE_READING};

/// Serve one canned HTTP/1.0 response per entry in `replies`, in order.
fn serve(replies: Vec<String>) -> (String, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://127.0.0.1:{}/api/ip", listener.local_addr().unwrap().port());
    let handle = std::thread::spawn(move || {
        let mut served = 0;
        for reply in replies {
            let (mut sock, _) = listener.accept().unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 512];
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }
            sock.write_all(reply.as_bytes()).unwrap();
            served += 1;
        }
        served
    });
    (url, handle)
}

fn ok_reply(body: &str) -> String {
    format!("HTTP/1.0 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}", body.len(), body)
}

#[test]
fn full_sync_over_local_server() {
    let (url, server) = serve(vec![
        "HTTP/1.0 502 Bad Gateway\r\n\r\n".into(),
        ok_reply(REFERENCE_PAYLOAD),
    ]);
    let config = SyncConfig {
        time_api_url: url,
        request_timeout_ms: 2_000,
        ..bounded_config(5)
    };

    let mut radio = WifiAdapter::new();
    radio.sim_fail_next(2);
    let link = ConnectivityManager::new(radio, creds(), &config);
    let mut sync = TimeSynchronizer::new(link, HttpAdapter::new(), RtcAdapter::new(), &config);

    let reading = sync.get_time().unwrap();
    assert_eq!(reading, REFERENCE_READING);
    assert_eq!(server.join().unwrap(), 2);

    assert_eq!(sync.link().driver().sim_connect_count(), 3);
    assert_eq!(sync.link().driver().sim_reset_count(), 1);
    assert_eq!(sync.clock().sim_set_count(), 1);

    let now = sync.clock().datetime().unwrap();
    assert_eq!((now.year, now.month, now.day), (2023, 6, 15));
}

#[test]
fn malformed_body_from_server_leaves_rtc_unset() {
    let (url, server) = serve(vec![ok_reply(r#"{"datetime":"not a date","day_of_year":1,"day_of_week":0,"dst":false}"#)]);
    let config = SyncConfig {
        time_api_url: url,
        ..bounded_config(1)
    };
    let link = ConnectivityManager::new(WifiAdapter::new(), creds(), &config);
    let mut sync = TimeSynchronizer::new(link, HttpAdapter::new(), RtcAdapter::new(), &config);

    assert!(sync.get_time().is_err());
    assert_eq!(server.join().unwrap(), 1);
    assert_eq!(sync.clock().sim_set_count(), 0);
}
