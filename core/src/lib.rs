//! API client core for the customer service.
//!
//! # Overview
//! Builds `HttpRequest` values and resolves completed responses into typed
//! events. The request/response logic is I/O-free; [`Transport`] executes
//! it asynchronously over `reqwest` for callers that want a ready-made
//! non-blocking client.
//!
//! # Design
//! - `CustomerClient` is stateless and holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Completed requests are routed by an explicit route table keyed on
//!   `(method, endpoint)`, using a per-request [`RequestContext`].
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod routes;
pub mod transport;
pub mod types;

pub use client::CustomerClient;
pub use config::{ClientConfig, ConfigError};
pub use context::RequestContext;
pub use dispatch::{complete, ApiEvent};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportFailure};
pub use routes::Route;
pub use transport::{PendingCall, Transport};
pub use types::{Customer, CustomerId, HealthStatus};
