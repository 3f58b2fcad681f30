//! HTTP client adapter.
//!
//! Implements [`HttpClient`] with a single blocking GET that buffers the
//! whole body.  Plain `http://` only; TLS is not supported.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::client::EspHttpConnection`
//!   wrapped in the `embedded_svc` client.
//! - **all other targets**: HTTP/1.0 over `std::net::TcpStream`, so the
//!   server closes the connection after the body and never chunks it.

use core::time::Duration;

use log::debug;

use crate::app::ports::{HttpClient, RequestOptions, Response};
use crate::error::HttpError;

#[cfg(not(target_os = "espidf"))]
use std::io::{Read, Write};
#[cfg(not(target_os = "espidf"))]
use std::net::{TcpStream, ToSocketAddrs};

#[cfg(target_os = "espidf")]
use embedded_svc::{
    http::{client::Client, Method, Status},
    io::Read,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

/// Timeout used when the request does not carry one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest response body accepted.
const MAX_RESPONSE_LEN: usize = 16 * 1024;

const USER_AGENT: &str = concat!("netclock/", env!("CARGO_PKG_VERSION"));

pub struct HttpAdapter {
    default_timeout: Duration,
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAdapter {
    pub fn new() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    fn timeout_for(&self, options: &RequestOptions) -> Duration {
        options
            .timeout_ms
            .map_or(self.default_timeout, |ms| Duration::from_millis(u64::from(ms)))
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HttpClient for HttpAdapter {
    fn get(&mut self, url: &str, options: &RequestOptions) -> Result<Response, HttpError> {
        if !url.starts_with("http://") {
            return Err(HttpError::UnsupportedScheme);
        }
        let connection = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(self.timeout_for(options)),
            ..Default::default()
        })
        .map_err(|_| HttpError::Connect)?;
        let mut client = Client::wrap(connection);

        let mut headers: Vec<(&str, &str)> = vec![("User-Agent", USER_AGENT), ("Accept", "application/json")];
        headers.extend(options.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        debug!("HTTP(espidf): GET {}", url);
        let request = client
            .request(Method::Get, url, &headers)
            .map_err(|_| HttpError::Connect)?;
        let mut response = request.submit().map_err(|_| HttpError::Io)?;
        let status = response.status();

        let mut body = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            let n = response.read(&mut buf).map_err(|_| HttpError::Io)?;
            if n == 0 {
                break;
            }
            if body.len() + n > MAX_RESPONSE_LEN {
                return Err(HttpError::MalformedResponse);
            }
            body.extend_from_slice(&buf[..n]);
        }
        Ok(Response::new(status, body))
    }
}

// ───────────────────────────────────────────────────────────────
// Host (std::net)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl HttpClient for HttpAdapter {
    fn get(&mut self, url: &str, options: &RequestOptions) -> Result<Response, HttpError> {
        let target = parse_url(url)?;
        let timeout = self.timeout_for(options);

        let addr = (target.host, target.port)
            .to_socket_addrs()
            .map_err(|_| HttpError::Connect)?
            .next()
            .ok_or(HttpError::Connect)?;
        let mut stream = TcpStream::connect_timeout(&addr, timeout).map_err(map_io_error)?;
        stream.set_read_timeout(Some(timeout)).map_err(|_| HttpError::Io)?;
        stream.set_write_timeout(Some(timeout)).map_err(|_| HttpError::Io)?;

        let mut request = format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: application/json\r\n",
            target.path, target.host, USER_AGENT
        );
        for (name, value) in &options.headers {
            request.push_str(name);
            request.push_str(": ");
            request.push_str(value);
            request.push_str("\r\n");
        }
        request.push_str("Connection: close\r\n\r\n");

        debug!("HTTP(sim): GET {}", url);
        stream.write_all(request.as_bytes()).map_err(map_io_error)?;

        let mut raw = Vec::new();
        stream
            .take(MAX_RESPONSE_LEN as u64 + 1)
            .read_to_end(&mut raw)
            .map_err(map_io_error)?;
        if raw.len() > MAX_RESPONSE_LEN {
            return Err(HttpError::MalformedResponse);
        }
        parse_response(&raw)
    }
}

#[cfg(not(target_os = "espidf"))]
fn map_io_error(e: std::io::Error) -> HttpError {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => HttpError::Timeout,
        std::io::ErrorKind::ConnectionRefused => HttpError::Connect,
        std::io::ErrorKind::NetworkUnreachable
        | std::io::ErrorKind::NetworkDown
        | std::io::ErrorKind::HostUnreachable
        | std::io::ErrorKind::NotConnected => HttpError::NotOk,
        _ => HttpError::Io,
    }
}

// ───────────────────────────────────────────────────────────────
// URL and response parsing (host client only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, PartialEq, Eq)]
struct Target<'a> {
    host: &'a str,
    port: u16,
    path: &'a str,
}

#[cfg(not(target_os = "espidf"))]
fn parse_url(url: &str) -> Result<Target<'_>, HttpError> {
    let Some(rest) = url.strip_prefix("http://") else {
        return Err(if url.contains("://") {
            HttpError::UnsupportedScheme
        } else {
            HttpError::InvalidUrl
        });
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().map_err(|_| HttpError::InvalidUrl)?),
        None => (authority, 80),
    };
    if host.is_empty() {
        return Err(HttpError::InvalidUrl);
    }
    Ok(Target { host, port, path })
}

#[cfg(not(target_os = "espidf"))]
fn parse_response(raw: &[u8]) -> Result<Response, HttpError> {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or(HttpError::MalformedResponse)?;
    let head = core::str::from_utf8(&raw[..split]).map_err(|_| HttpError::MalformedResponse)?;
    let mut body = &raw[split + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines.next().ok_or(HttpError::MalformedResponse)?;
    let mut fields = status_line.split(' ');
    let version = fields.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::MalformedResponse);
    }
    let status: u16 = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(HttpError::MalformedResponse)?;

    let mut chunked = false;
    for line in lines {
        let (name, value) = line.split_once(':').ok_or(HttpError::MalformedResponse)?;
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            let len: usize = value.parse().map_err(|_| HttpError::MalformedResponse)?;
            if len > body.len() {
                return Err(HttpError::MalformedResponse);
            }
            body = &body[..len];
        } else if name.eq_ignore_ascii_case("transfer-encoding") && value.eq_ignore_ascii_case("chunked") {
            chunked = true;
        }
    }

    let body = if chunked { decode_chunked(body)? } else { body.to_vec() };
    Ok(Response::new(status, body))
}

#[cfg(not(target_os = "espidf"))]
fn decode_chunked(mut raw: &[u8]) -> Result<Vec<u8>, HttpError> {
    let mut out = Vec::new();
    loop {
        let eol = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or(HttpError::MalformedResponse)?;
        let size_field = core::str::from_utf8(&raw[..eol]).map_err(|_| HttpError::MalformedResponse)?;
        let size_hex = size_field.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16).map_err(|_| HttpError::MalformedResponse)?;
        raw = &raw[eol + 2..];
        if size == 0 {
            return Ok(out);
        }
        if raw.len() < size + 2 {
            return Err(HttpError::MalformedResponse);
        }
        out.extend_from_slice(&raw[..size]);
        raw = &raw[size + 2..];
    }
}
