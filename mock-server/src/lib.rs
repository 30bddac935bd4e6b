use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

impl CustomerInput {
    fn is_complete(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty() && !self.address.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    customers: BTreeMap<i64, Customer>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub const NOT_FOUND_MESSAGE: &str = "Customer not found";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: firstName, lastName, address";

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/health", get(health))
        .route("/api/customers", get(list_customers).post(create_customer))
        .route(
            "/api/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock customer API listening");
    }
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn list_customers(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let customers: Vec<&Customer> = store.customers.values().collect();
    Json(json!({
        "success": true,
        "data": customers,
        "count": customers.len(),
    }))
}

async fn get_customer(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.customers.get(&id) {
        Some(customer) => (StatusCode::OK, Json(json!({ "success": true, "data": customer }))),
        None => failure(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
    }
}

async fn create_customer(State(db): State<Db>, Json(input): Json<CustomerInput>) -> Reply {
    if !input.is_complete() {
        return failure(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE);
    }
    let mut store = db.write().await;
    store.next_id += 1;
    let now = Utc::now();
    let customer = Customer {
        id: store.next_id,
        first_name: input.first_name,
        last_name: input.last_name,
        address: input.address,
        created_at: now,
        updated_at: now,
    };
    store.customers.insert(customer.id, customer.clone());
    info!(id = customer.id, "customer created");
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": customer,
            "message": "Customer created successfully",
        })),
    )
}

async fn update_customer(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Reply {
    if !input.is_complete() {
        return failure(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE);
    }
    let mut store = db.write().await;
    let Some(customer) = store.customers.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE);
    };
    customer.first_name = input.first_name;
    customer.last_name = input.last_name;
    customer.address = input.address;
    customer.updated_at = Utc::now();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": customer,
            "message": "Customer updated successfully",
        })),
    )
}

async fn delete_customer(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let mut store = db.write().await;
    match store.customers.remove(&id) {
        Some(_) => {
            info!(id, "customer deleted");
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": "Customer deleted successfully" })),
            )
        }
        None => failure(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
    }
}
