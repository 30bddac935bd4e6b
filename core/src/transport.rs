//! Async executor for [`CustomerClient`] requests.
//!
//! # Design
//! Every operation returns a [`PendingCall`] straight away and runs the
//! round-trip on a spawned Tokio task; nothing is sent or awaited on the
//! caller's stack. The task owns the request's [`RequestContext`], reads
//! the body once with `bytes()`, and hands both to [`dispatch::complete`].
//!
//! The in-flight table only tracks which calls are outstanding. Routing
//! never reads from it: each task already holds its own context.

use std::collections::HashMap;
use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{ready, Context, Poll};

use reqwest::redirect::Policy;
use reqwest::Url;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::CustomerClient;
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::dispatch::{self, ApiEvent};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportFailure};
use crate::types::{Customer, CustomerId};

const MAX_REDIRECTS: usize = 10;

type InFlight = Arc<Mutex<HashMap<Uuid, RequestContext>>>;

/// Non-blocking customer API client.
///
/// Operations must be issued from inside a Tokio runtime; outside one they
/// resolve immediately to [`ApiError::Client`].
#[derive(Debug)]
pub struct Transport {
    client: CustomerClient,
    http: reqwest::Client,
    timeout_ms: u64,
    in_flight: InFlight,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect_policy())
            .build()
            .map_err(|e| ApiError::Client(error_chain(&e)))?;

        debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms(), "transport ready");

        Ok(Self {
            client: CustomerClient::new(&config.base_url),
            http,
            timeout_ms: config.timeout_ms(),
            in_flight: Arc::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Calls already in flight keep the URL they were issued with.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.client.set_base_url(base_url);
        debug!(base_url = %self.client.base_url(), "base URL changed");
    }

    /// Number of calls issued but not yet completed.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn list_all(&self) -> PendingCall {
        self.issue(self.client.build_list_customers())
    }

    pub fn get_by_id(&self, id: CustomerId) -> PendingCall {
        self.issue(self.client.build_get_customer(id))
    }

    pub fn create(&self, customer: &Customer) -> PendingCall {
        match self.client.build_create_customer(customer) {
            Ok(request) => self.issue(request),
            Err(err) => PendingCall::resolved(err),
        }
    }

    pub fn update(&self, id: CustomerId, customer: &Customer) -> PendingCall {
        match self.client.build_update_customer(id, customer) {
            Ok(request) => self.issue(request),
            Err(err) => PendingCall::resolved(err),
        }
    }

    pub fn delete(&self, id: CustomerId) -> PendingCall {
        self.issue(self.client.build_delete_customer(id))
    }

    pub fn health_check(&self) -> PendingCall {
        self.issue(self.client.build_health_check())
    }

    fn issue(&self, request: HttpRequest) -> PendingCall {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return PendingCall::resolved(ApiError::Client(
                "requests must be issued from within a Tokio runtime".to_string(),
            ));
        };

        let ctx = RequestContext::for_request(&request);
        let handle = ctx.handle;
        debug!(%handle, method = %request.method, url = %request.url, "sending request");
        lock(&self.in_flight).insert(handle, ctx.clone());
        let entry = InFlightEntry {
            table: Arc::clone(&self.in_flight),
            handle,
        };

        let http = self.http.clone();
        let timeout_ms = self.timeout_ms;
        let task = runtime.spawn(async move {
            let outcome = execute(&http, request, timeout_ms).await;
            drop(entry);
            dispatch::complete(&ctx, outcome)
        });

        PendingCall {
            handle: Some(handle),
            state: PendingState::Running(task),
        }
    }
}

/// Removes its call from the in-flight table when dropped, including when
/// the runtime shuts down before the task finishes.
struct InFlightEntry {
    table: InFlight,
    handle: Uuid,
}

impl Drop for InFlightEntry {
    fn drop(&mut self) {
        lock(&self.table).remove(&self.handle);
    }
}

/// The eventual result of one API call.
///
/// Awaiting it yields the decoded [`ApiEvent`] or the [`ApiError`] the
/// call ended in. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct PendingCall {
    handle: Option<Uuid>,
    state: PendingState,
}

#[derive(Debug)]
enum PendingState {
    Running(JoinHandle<Result<ApiEvent, ApiError>>),
    Resolved(Option<Result<ApiEvent, ApiError>>),
}

impl PendingCall {
    fn resolved(err: ApiError) -> Self {
        Self {
            handle: None,
            state: PendingState::Resolved(Some(Err(err))),
        }
    }

    /// In-flight handle of the request, `None` when it was never sent.
    pub fn handle(&self) -> Option<Uuid> {
        self.handle
    }
}

impl Future for PendingCall {
    type Output = Result<ApiEvent, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            PendingState::Running(task) => {
                let joined = ready!(Pin::new(task).poll(cx));
                // A finished JoinHandle must not be polled again.
                self.state = PendingState::Resolved(None);
                Poll::Ready(joined.unwrap_or_else(|e| {
                    Err(ApiError::Client(format!("request task failed: {e}")))
                }))
            }
            PendingState::Resolved(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(ApiError::Client("call polled after completion".to_string()))
            })),
        }
    }
}

#[instrument(level = "debug", skip_all, fields(method = %request.method, endpoint = %request.endpoint))]
async fn execute(
    http: &reqwest::Client,
    request: HttpRequest,
    timeout_ms: u64,
) -> Result<HttpResponse, TransportFailure> {
    let mut builder = http.request(to_reqwest(request.method), request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| transport_failure(&e, timeout_ms))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    // The body is read here and nowhere else.
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_failure(&e, timeout_ms))?;

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn transport_failure(err: &reqwest::Error, timeout_ms: u64) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::TimedOut {
            after_ms: timeout_ms,
        }
    } else {
        TransportFailure::failed(error_chain(err))
    }
}

/// `reqwest` keeps the useful part (DNS, TLS, redirect refusal) in the
/// source chain, so flatten it into one line.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Follow redirects, but never from HTTPS to a less secure scheme.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| match redirect_decision(attempt.previous(), attempt.url()) {
        RedirectDecision::Follow => attempt.follow(),
        RedirectDecision::TooMany => attempt.error("too many redirects"),
        RedirectDecision::Downgrade => attempt.error("refusing redirect from https to http"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectDecision {
    Follow,
    TooMany,
    Downgrade,
}

/// `previous` holds every URL already requested, ending with the one that
/// answered with this redirect.
fn redirect_decision(previous: &[Url], next: &Url) -> RedirectDecision {
    if previous.len() > MAX_REDIRECTS {
        return RedirectDecision::TooMany;
    }
    match previous.last() {
        Some(from) if is_downgrade(from, next) => RedirectDecision::Downgrade,
        _ => RedirectDecision::Follow,
    }
}

fn is_downgrade(from: &Url, to: &Url) -> bool {
    from.scheme() == "https" && to.scheme() != "https"
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<Uuid, RequestContext>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
