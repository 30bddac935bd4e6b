use std::fmt::Write as _;

use customer_core::{ApiError, ApiEvent, Customer};

pub fn outcome(result: &Result<ApiEvent, ApiError>) -> String {
    match result {
        Ok(event) => format!("=== SUCCESS ===\n{}", event_text(event)),
        Err(err) => format!("=== ERROR ===\n{err}\n"),
    }
}

fn event_text(event: &ApiEvent) -> String {
    match event {
        ApiEvent::HealthChecked(health) => format!("Server Status: {}\n", health.status),
        ApiEvent::CustomersReceived(customers) => {
            let mut out = format!("Customers: {}\n", customers.len());
            for customer in customers {
                out.push_str(&customer_line(customer));
            }
            out
        }
        ApiEvent::CustomerReceived(customer) => customer_line(customer),
        ApiEvent::CustomerCreated(customer) => format!("Created\n{}", customer_line(customer)),
        ApiEvent::CustomerUpdated(customer) => format!("Updated\n{}", customer_line(customer)),
        ApiEvent::CustomerDeleted(id) => format!("Deleted customer {id}\n"),
    }
}

fn customer_line(customer: &Customer) -> String {
    let mut line = format!("#{} {}, {}", customer.id, customer.full_name(), customer.address);
    if let Some(created) = customer.created_at {
        let _ = write!(line, " (created {})", created.format("%Y-%m-%d %H:%M:%S"));
    }
    line.push('\n');
    line
}
