//! Route table mapping a completed request back to its response decoder.
//!
//! Every request the client issues is built from one of these templates, so
//! resolving the remembered `(method, endpoint)` pair against the same table
//! picks the decoder without any ad hoc prefix comparisons.

use crate::http::HttpMethod;

/// One decodable API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ListCustomers,
    GetCustomer,
    CreateCustomer,
    UpdateCustomer,
    DeleteCustomer,
    Health,
}

pub const CUSTOMERS_PATH: &str = "/api/customers";
pub const CUSTOMER_PATH: &str = "/api/customers/{id}";
pub const HEALTH_PATH: &str = "/health";

const ROUTE_TABLE: &[(HttpMethod, &str, Route)] = &[
    (HttpMethod::Get, CUSTOMERS_PATH, Route::ListCustomers),
    (HttpMethod::Get, CUSTOMER_PATH, Route::GetCustomer),
    (HttpMethod::Post, CUSTOMERS_PATH, Route::CreateCustomer),
    (HttpMethod::Put, CUSTOMER_PATH, Route::UpdateCustomer),
    (HttpMethod::Delete, CUSTOMER_PATH, Route::DeleteCustomer),
    (HttpMethod::Get, HEALTH_PATH, Route::Health),
];

impl Route {
    /// Find the route for a method and an endpoint path such as
    /// `/api/customers/42`. Query strings are ignored.
    pub fn resolve(method: HttpMethod, endpoint: &str) -> Option<Route> {
        let path = endpoint.split('?').next().unwrap_or_default();
        ROUTE_TABLE
            .iter()
            .find(|(m, template, _)| *m == method && matches_template(template, path))
            .map(|(_, _, route)| *route)
    }

    pub fn method(self) -> HttpMethod {
        self.entry().0
    }

    pub fn template(self) -> &'static str {
        self.entry().1
    }

    fn entry(self) -> (HttpMethod, &'static str) {
        ROUTE_TABLE
            .iter()
            .find(|(_, _, route)| *route == self)
            .map(|(m, t, _)| (*m, *t))
            .unwrap_or((HttpMethod::Get, HEALTH_PATH))
    }
}

/// `{name}` segments match exactly one non-empty segment; everything else
/// must match literally.
fn matches_template(template: &str, path: &str) -> bool {
    let mut want = template.split('/');
    let mut got = path.split('/');
    loop {
        match (want.next(), got.next()) {
            (None, None) => return true,
            (Some(w), Some(g)) if w.starts_with('{') && w.ends_with('}') => {
                if g.is_empty() {
                    return false;
                }
            }
            (Some(w), Some(g)) if w == g => {}
            _ => return false,
        }
    }
}

/// Last path segment of an endpoint, which for item routes is the id.
pub fn trailing_id(endpoint: &str) -> Option<i64> {
    let path = endpoint.split('?').next().unwrap_or_default();
    path.rsplit('/').next().and_then(|segment| segment.parse().ok())
}
