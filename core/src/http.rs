//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! builder in [`crate::client`] produces `HttpRequest` values and the
//! dispatcher in [`crate::dispatch`] consumes `HttpResponse` values without
//! touching the network. Whoever executes the request (the async
//! [`crate::transport::Transport`], or a test harness) reads the response
//! body exactly once and hands it over as an owned `String`, so no decode
//! path can ever observe a half-consumed body.

use std::fmt;

pub const CONTENT_TYPE_JSON: (&str, &str) = ("content-type", "application/json");

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `endpoint` is the path relative to the base URL and is what responses are
/// routed by; `url` is the absolute target.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub endpoint: String,
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
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that ended without any HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The transfer timeout elapsed and the request was aborted.
    TimedOut { after_ms: u64 },
    /// DNS, TLS, connection or redirect failure, described by the transport.
    Failed { message: String },
}

impl TransportFailure {
    pub fn failed(message: impl Into<String>) -> Self {
        TransportFailure::Failed {
            message: message.into(),
        }
    }
}
