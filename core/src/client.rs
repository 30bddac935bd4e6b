//! Stateless HTTP request builder and response parser for the customer API.
//!
//! # Design
//! `CustomerClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes the matching `HttpResponse`, so the client can be driven by
//! any executor. [`crate::transport::Transport`] is the async executor
//! shipped with this crate; tests drive it with a blocking one.

use serde_json::Value;

use crate::dispatch;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE_JSON};
use crate::routes::{CUSTOMERS_PATH, HEALTH_PATH};
use crate::types::{Customer, CustomerId, HealthStatus};

/// Synchronous, stateless client for the customer API.
#[derive(Debug, Clone)]
pub struct CustomerClient {
    base_url: String,
}

impl CustomerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn build_list_customers(&self) -> HttpRequest {
        self.request(HttpMethod::Get, CUSTOMERS_PATH.to_string(), None)
    }

    pub fn build_get_customer(&self, id: CustomerId) -> HttpRequest {
        self.request(HttpMethod::Get, item_path(id), None)
    }

    /// The body carries the three editable fields only; id and timestamps
    /// belong to the server.
    pub fn build_create_customer(&self, customer: &Customer) -> Result<HttpRequest, ApiError> {
        let body = write_body(customer)?;
        Ok(self.request(HttpMethod::Post, CUSTOMERS_PATH.to_string(), Some(body)))
    }

    /// The target id travels in the path; any id on `customer` is ignored.
    pub fn build_update_customer(
        &self,
        id: CustomerId,
        customer: &Customer,
    ) -> Result<HttpRequest, ApiError> {
        let body = write_body(customer)?;
        Ok(self.request(HttpMethod::Put, item_path(id), Some(body)))
    }

    pub fn build_delete_customer(&self, id: CustomerId) -> HttpRequest {
        self.request(HttpMethod::Delete, item_path(id), None)
    }

    pub fn build_health_check(&self) -> HttpRequest {
        self.request(HttpMethod::Get, HEALTH_PATH.to_string(), None)
    }

    pub fn parse_list_customers(&self, response: HttpResponse) -> Result<Vec<Customer>, ApiError> {
        check_status(&response)?;
        dispatch::decode_list(&response.body)
    }

    pub fn parse_get_customer(&self, response: HttpResponse) -> Result<Customer, ApiError> {
        check_status(&response)?;
        dispatch::decode_single(&response.body)
    }

    pub fn parse_create_customer(&self, response: HttpResponse) -> Result<Customer, ApiError> {
        check_status(&response)?;
        dispatch::decode_single(&response.body)
    }

    pub fn parse_update_customer(&self, response: HttpResponse) -> Result<Customer, ApiError> {
        check_status(&response)?;
        dispatch::decode_single(&response.body)
    }

    /// Returns the deleted id, which the API does not echo back.
    pub fn parse_delete_customer(
        &self,
        id: CustomerId,
        response: HttpResponse,
    ) -> Result<CustomerId, ApiError> {
        check_status(&response)?;
        dispatch::decode_delete(&response.body)?;
        Ok(id)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        check_status(&response)?;
        dispatch::decode_health(&response.body)
    }

    fn request(&self, method: HttpMethod, endpoint: String, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            endpoint,
            headers: vec![(CONTENT_TYPE_JSON.0.to_string(), CONTENT_TYPE_JSON.1.to_string())],
            body,
        }
    }
}

fn item_path(id: CustomerId) -> String {
    format!("{CUSTOMERS_PATH}/{id}")
}

fn write_body(customer: &Customer) -> Result<String, ApiError> {
    let mut payload = customer.to_payload();
    if let Value::Object(fields) = &mut payload {
        fields.remove("id");
        fields.remove("createdAt");
        fields.remove("updatedAt");
    }
    serde_json::to_string(&payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(dispatch::http_error(response))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn client() -> CustomerClient {
        CustomerClient::new("http://localhost:3000")
    }

    fn id(n: i64) -> CustomerId {
        CustomerId::new(n).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_customers_produces_correct_request() {
        let req = client().build_list_customers();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/customers");
        assert_eq!(req.endpoint, "/api/customers");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_get_customer_produces_correct_request() {
        let req = client().build_get_customer(id(42));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/customers/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_customer_strips_server_fields() {
        let mut customer = Customer::new("Ada", "Lovelace", "London");
        customer.id = 9;
        customer.created_at = Some(Utc::now());
        customer.updated_at = Some(Utc::now());

        let req = client().build_create_customer(&customer).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/customers");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"firstName": "Ada", "lastName": "Lovelace", "address": "London"})
        );
    }

    #[test]
    fn build_update_customer_puts_id_in_path_only() {
        let mut customer = Customer::new("Ada", "King", "Surrey");
        customer.id = 1;
        let req = client().build_update_customer(id(5), &customer).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.endpoint, "/api/customers/5");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["lastName"], "King");
    }

    #[test]
    fn build_create_does_not_validate() {
        let req = client().build_create_customer(&Customer::default()).unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["firstName"], "");
    }

    #[test]
    fn build_delete_customer_produces_correct_request() {
        let req = client().build_delete_customer(id(3));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/api/customers/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_health_check_targets_root_health() {
        let req = client().build_health_check();
        assert_eq!(req.url, "http://localhost:3000/health");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CustomerClient::new("https://example.test/");
        assert_eq!(client.build_list_customers().url, "https://example.test/api/customers");
    }

    #[test]
    fn base_url_can_be_changed() {
        let mut client = client();
        client.set_base_url("https://staging.example.test//");
        assert_eq!(client.base_url(), "https://staging.example.test");
        assert_eq!(client.build_health_check().url, "https://staging.example.test/health");
    }

    #[test]
    fn parse_list_customers_success() {
        let customers = client()
            .parse_list_customers(response(
                200,
                r#"{"success":true,"data":[{"id":1,"firstName":"T","lastName":"U","address":"V"}]}"#,
            ))
            .unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].first_name, "T");
    }

    #[test]
    fn parse_get_customer_not_found() {
        let err = client()
            .parse_get_customer(response(404, r#"{"success":false,"message":"Customer not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, ref message } if message == "Customer not found"));
    }

    #[test]
    fn parse_create_customer_success() {
        let customer = client()
            .parse_create_customer(response(
                201,
                r#"{"success":true,"data":{"id":6,"firstName":"N","lastName":"M","address":"A","createdAt":"2025-02-01T12:00:00.000Z"},"message":"Customer created successfully"}"#,
            ))
            .unwrap();
        assert_eq!(customer.id, 6);
        assert!(customer.created_at.is_some());
    }

    #[test]
    fn parse_update_customer_rejected() {
        let err = client()
            .parse_update_customer(response(200, r#"{"success":false,"message":"nope"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn parse_delete_customer_returns_requested_id() {
        let deleted = client()
            .parse_delete_customer(id(11), response(200, r#"{"success":true}"#))
            .unwrap();
        assert_eq!(deleted, id(11));
    }

    #[test]
    fn parse_health_bad_json() {
        let err = client().parse_health(response(200, "not json")).unwrap_err();
        assert_eq!(err, ApiError::InvalidResponse);
    }
}
