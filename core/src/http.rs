//! HTTP transport types and the blocking transport seam.
//!
//! # Design
//! Requests and responses are plain data. `GhostbinClient` builds
//! `HttpRequest` values and parses `HttpResponse` values; the only code that
//! touches the network is a `Transport` implementation. The default
//! `UreqTransport` never follows redirects, so a `303 See Other` from
//! `/paste/new` reaches the caller with its `Location` header intact.
//!
//! Every status code comes back as data. Mapping 4xx/5xx to errors is the
//! client's job, which keeps the status dispatch in one place per operation.

use std::time::Duration;

use crate::error::GhostbinError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// Built by `GhostbinClient::build_*` methods.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Executes a single HTTP exchange.
///
/// Implementations must return 3xx responses as data instead of following
/// them, and should return 4xx/5xx as data as well. `Err` is reserved for
/// failures where no response was obtained.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GhostbinError>;
}

/// Blocking transport backed by a `ureq::Agent` with redirects disabled.
///
/// Response bodies are read in full unless a limit is set with
/// `with_body_limit`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }

    /// Refuse response bodies longer than `limit` bytes.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GhostbinError> {
        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or_default().as_bytes())
            }
        };
        let mut response = result.map_err(|e| GhostbinError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()
            .map_err(|e| match e {
                ureq::Error::BodyExceedsLimit(limit) => GhostbinError::BodyTooLarge { limit },
                other => GhostbinError::Network(other.to_string()),
            })?;

        tracing::debug!(status, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Serve one `200 OK` with `body_len` bytes of text and return its URL.
    fn serve_once(body_len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {body_len}\r\nConnection: close\r\n\r\n"
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&vec![b'a'; body_len]);
        });
        format!("http://{addr}/paste/abc/raw")
    }

    fn get(url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn reads_bodies_past_ureq_default_limit() {
        let len = 11 * 1024 * 1024;
        let response = UreqTransport::default().send(&get(serve_once(len))).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), len);
    }

    #[test]
    fn configured_body_limit_is_its_own_error() {
        let transport = UreqTransport::default().with_body_limit(1024);
        let err = transport.send(&get(serve_once(4096))).unwrap_err();
        assert!(matches!(err, GhostbinError::BodyTooLarge { limit: 1024 }));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 303,
            headers: vec![("location".to_string(), "/paste/abc123".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("Location"), Some("/paste/abc123"));
        assert_eq!(response.header("LOCATION"), Some("/paste/abc123"));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn unreachable_host_is_network_error() {
        let transport = UreqTransport::new(Some(Duration::from_secs(2)));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/languages.json".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(&request).unwrap_err();
        assert!(matches!(err, GhostbinError::Network(_)));
    }
}
