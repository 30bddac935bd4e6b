use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Customer, MISSING_FIELDS_MESSAGE, NOT_FOUND_MESSAGE};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

// --- list ---

#[tokio::test]
async fn list_customers_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/customers")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

// --- create ---

#[tokio::test]
async fn create_customer_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            r#"{"firstName":"Aino","lastName":"Aalto","address":"Espoo"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Customer created successfully");
    let customer: Customer = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(customer.id, 1);
    assert_eq!(customer.first_name, "Aino");
    assert_eq!(customer.created_at, customer.updated_at);
}

#[tokio::test]
async fn create_customer_missing_field_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            r#"{"firstName":"Aino","lastName":""}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], MISSING_FIELDS_MESSAGE);
}

// --- get ---

#[tokio::test]
async fn get_customer_not_found() {
    let resp = app().oneshot(empty_request("GET", "/api/customers/77")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn get_customer_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/customers/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_customer_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/api/customers/5",
            r#"{"firstName":"A","lastName":"B","address":"C"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_customer_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/api/customers/5")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/customers",
            r#"{"firstName":"Eero","lastName":"Saarinen","address":"Kirkkonummi"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Customer = serde_json::from_value(body_json(resp).await["data"].clone()).unwrap();
    let id = created.id;

    // list — should contain the one customer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/customers"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], id);

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/customers/{id}"),
            r#"{"firstName":"Eero","lastName":"Saarinen","address":"Helsinki"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Customer = serde_json::from_value(body_json(resp).await["data"].clone()).unwrap();
    assert_eq!(updated.address, "Helsinki");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/customers/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Customer = serde_json::from_value(body_json(resp).await["data"].clone()).unwrap();
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/customers/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_none());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/customers/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete again — 404, body still an envelope
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/customers/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!body_bytes(resp).await.is_empty());
}
