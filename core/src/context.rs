//! Per-request descriptor carried from issue to completion.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::http::{HttpMethod, HttpRequest};

/// What the dispatcher needs to know about a request once its response
/// arrives. One is created per call and moved into that call's completion,
/// so overlapping requests never see each other's metadata.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub handle: Uuid,
    pub method: HttpMethod,
    pub endpoint: String,
    pub issued_at: Instant,
}

impl RequestContext {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            handle: Uuid::new_v4(),
            method,
            endpoint: endpoint.into(),
            issued_at: Instant::now(),
        }
    }

    pub fn for_request(request: &HttpRequest) -> Self {
        Self::new(request.method, request.endpoint.as_str())
    }

    pub fn elapsed(&self) -> Duration {
        self.issued_at.elapsed()
    }
}
