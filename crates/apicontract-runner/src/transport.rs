//! HTTP exchange behind a trait
//!
//! The runner performs exactly one blocking exchange per run. Production
//! uses reqwest's blocking client with redirects disabled; tests script
//! responses in memory.

use std::time::Duration;

use apicontract_core::{ErrorKind, HttpMethod};

/// Outbound request, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value under the same name
    /// (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Reply as seen by the validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Sends one request and waits for the reply.
pub trait Transport {
    /// # Errors
    ///
    /// Returns error on any network-level failure (connect, timeout, read).
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("Cannot read the response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Transport
    }
}

/// reqwest blocking client that never follows redirects, so a 3xx is
/// validated as-is.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder =
            reqwest::blocking::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut req = self.client.request(method, &request.url);
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let resp = req.send().map_err(|e| TransportError::Request {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.text().map_err(|e| TransportError::Body {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://localhost/a");
        req.set_header("X-Api-Key", "one");
        req.set_header("x-api-key", "two");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("X-API-KEY"), Some("two"));
    }

    #[test]
    fn response_header_lookup() {
        let resp = HttpResponse::new(200)
            .with_header("Content-Type", "application/json; charset=utf-8")
            .with_body("[]");
        assert_eq!(
            resp.content_type(),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn unreachable_host_is_a_request_error() {
        let transport = ReqwestTransport::new(Some(Duration::from_secs(2))).unwrap();
        let req = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:1/unreachable");
        let err = transport.send(&req).unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
