//! Completion dispatch: turns a finished request into one typed outcome.
//!
//! # Design
//! `complete` is the single place a response is interpreted. It takes the
//! request's own [`RequestContext`] by reference and the already-read
//! response by value, so the body has been read exactly once and two
//! overlapping requests can never be routed with each other's metadata.
//!
//! Anything that is not a 2xx response, including a failure with no
//! response at all, goes down the error path and is never decoded as a
//! success envelope. A 2xx response is routed through [`Route::resolve`];
//! a pair that resolves to nothing is reported as [`ApiError::Unrouted`]
//! rather than being dropped.

use ::http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::http::{HttpResponse, TransportFailure};
use crate::routes::{trailing_id, Route};
use crate::types::{Customer, HealthStatus};

/// A successfully decoded API result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEvent {
    CustomersReceived(Vec<Customer>),
    CustomerReceived(Customer),
    CustomerCreated(Customer),
    CustomerUpdated(Customer),
    /// Id of the deleted customer, taken from the request path.
    CustomerDeleted(i64),
    HealthChecked(HealthStatus),
}

/// Resolve a finished request into an event or an error.
pub fn complete(
    ctx: &RequestContext,
    outcome: Result<HttpResponse, TransportFailure>,
) -> Result<ApiEvent, ApiError> {
    let elapsed_ms = ctx.elapsed().as_millis();
    let response = match outcome {
        Ok(response) => response,
        Err(failure) => {
            warn!(
                handle = %ctx.handle,
                method = %ctx.method,
                endpoint = %ctx.endpoint,
                elapsed_ms,
                ?failure,
                "request failed without a response"
            );
            return Err(failure_error(failure));
        }
    };

    debug!(
        handle = %ctx.handle,
        method = %ctx.method,
        endpoint = %ctx.endpoint,
        status = response.status,
        elapsed_ms,
        body_len = response.body.len(),
        "response received"
    );

    if !response.is_success() {
        let err = http_error(&response);
        warn!(handle = %ctx.handle, status = response.status, "{err}");
        return Err(err);
    }

    let Some(route) = Route::resolve(ctx.method, &ctx.endpoint) else {
        warn!(
            handle = %ctx.handle,
            method = %ctx.method,
            endpoint = %ctx.endpoint,
            "no response handler for request"
        );
        return Err(ApiError::Unrouted {
            method: ctx.method.to_string(),
            endpoint: ctx.endpoint.clone(),
        });
    };

    debug!(handle = %ctx.handle, ?route, template = route.template(), "decoding response");
    decode(route, &ctx.endpoint, &response.body)
}

/// Run the success-path decoder for `route` over a 2xx body.
pub(crate) fn decode(route: Route, endpoint: &str, body: &str) -> Result<ApiEvent, ApiError> {
    match route {
        Route::ListCustomers => decode_list(body).map(ApiEvent::CustomersReceived),
        Route::GetCustomer => decode_single(body).map(ApiEvent::CustomerReceived),
        Route::CreateCustomer => decode_single(body).map(ApiEvent::CustomerCreated),
        Route::UpdateCustomer => decode_single(body).map(ApiEvent::CustomerUpdated),
        Route::DeleteCustomer => {
            decode_delete(body)?;
            Ok(ApiEvent::CustomerDeleted(trailing_id(endpoint).unwrap_or(0)))
        }
        Route::Health => decode_health(body).map(ApiEvent::HealthChecked),
    }
}

pub(crate) fn decode_list(body: &str) -> Result<Vec<Customer>, ApiError> {
    let json = parse_object(body)?;
    let data = accepted(&json)?;
    let customers: Vec<Customer> = data
        .as_array()
        .map(|items| items.iter().map(Customer::from_payload).collect())
        .unwrap_or_default();
    debug!(count = customers.len(), "decoded customer list");
    Ok(customers)
}

pub(crate) fn decode_single(body: &str) -> Result<Customer, ApiError> {
    let json = parse_object(body)?;
    accepted(&json).map(Customer::from_payload)
}

pub(crate) fn decode_delete(body: &str) -> Result<(), ApiError> {
    accepted(&parse_object(body)?).map(|_| ())
}

pub(crate) fn decode_health(body: &str) -> Result<HealthStatus, ApiError> {
    parse_object(body).map(|json| HealthStatus::from_payload(&json))
}

/// Build the error for a non-2xx response.
///
/// The body's `message` wins when present and non-empty; otherwise the
/// status's own description is used.
pub(crate) fn http_error(response: &HttpResponse) -> ApiError {
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status_text(response.status));
    ApiError::Http {
        status: response.status,
        message,
    }
}

fn failure_error(failure: TransportFailure) -> ApiError {
    match failure {
        TransportFailure::TimedOut { after_ms } => ApiError::Timeout { after_ms },
        TransportFailure::Failed { message } => ApiError::Transport { message },
    }
}

fn status_text(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("unknown status");
    format!("server replied: {reason}")
}

fn parse_object(body: &str) -> Result<Value, ApiError> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) if json.is_object() => Ok(json),
        _ => Err(ApiError::InvalidResponse),
    }
}

/// Check the `success` flag of an envelope and hand back its `data`.
fn accepted(json: &Value) -> Result<&Value, ApiError> {
    if json.get("success").and_then(Value::as_bool).unwrap_or(false) {
        Ok(json.get("data").unwrap_or(&Value::Null))
    } else {
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Err(ApiError::Rejected { message })
    }
}
