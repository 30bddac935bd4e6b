//! Domain records for the customer API.
//!
//! # Design
//! The server is authoritative for ids and timestamps, so the record is
//! lenient on the way in and conservative on the way out: `from_payload`
//! never fails (missing or mistyped fields fall back to their empty value),
//! while `to_payload` omits whatever the record does not actually carry.
//! The JSON mapping is written out by hand rather than derived because
//! both directions are conditional on field contents, not just presence.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Identifier of a customer that exists on the server. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerId(i64);

impl CustomerId {
    pub fn new(id: i64) -> Result<Self, ApiError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(ApiError::InvalidId(id))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for CustomerId {
    type Error = ApiError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<CustomerId> for i64 {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank customer as exchanged with the API.
///
/// `id == 0` (or anything below) marks a record that has not been stored
/// yet. Timestamps are assigned by the server and are `None` until a
/// response has carried them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// An unsaved customer with the three required fields filled in.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// True when first name, last name and address are all non-empty.
    /// Id and timestamps play no part.
    pub fn is_valid(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty() && !self.address.is_empty()
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    pub fn persisted_id(&self) -> Option<CustomerId> {
        CustomerId::new(self.id).ok()
    }

    /// Encode as a `CustomerJSON` object.
    ///
    /// `id` is emitted only for stored records and each timestamp only when
    /// set, formatted as ISO-8601 with second precision.
    pub fn to_payload(&self) -> Value {
        let mut json = Map::new();
        if self.id > 0 {
            json.insert("id".to_string(), Value::from(self.id));
        }
        json.insert("firstName".to_string(), Value::from(self.first_name.as_str()));
        json.insert("lastName".to_string(), Value::from(self.last_name.as_str()));
        json.insert("address".to_string(), Value::from(self.address.as_str()));
        if let Some(created_at) = self.created_at {
            json.insert("createdAt".to_string(), Value::from(format_timestamp(created_at)));
        }
        if let Some(updated_at) = self.updated_at {
            json.insert("updatedAt".to_string(), Value::from(format_timestamp(updated_at)));
        }
        Value::Object(json)
    }

    /// Decode a `CustomerJSON` object. Never fails; anything that is not an
    /// object decodes to `Customer::default()`.
    pub fn from_payload(json: &Value) -> Self {
        Self {
            id: json.get("id").and_then(Value::as_i64).unwrap_or(0),
            first_name: string_field(json, "firstName"),
            last_name: string_field(json, "lastName"),
            address: string_field(json, "address"),
            created_at: timestamp_field(json, "createdAt"),
            updated_at: timestamp_field(json, "updatedAt"),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn from_payload(json: &Value) -> Self {
        Self {
            status: string_field(json, "status"),
        }
    }
}

fn string_field(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn timestamp_field(json: &Value, key: &str) -> Option<DateTime<Utc>> {
    json.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .and_then(parse_timestamp)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accepts RFC 3339 with any offset, or a bare local date-time taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
