//! Terminal harness for the customer API: issue one call, print the result.

mod render;

use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use customer_core::{ClientConfig, Customer, CustomerId, Transport};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "customer-cli", version, about = "Check connectivity to the customer API and show raw results")]
struct Cli {
    /// API root; defaults to $CUSTOMER_API_BASE_URL or the production host.
    #[arg(long)]
    base_url: Option<String>,

    /// Transfer timeout; defaults to $CUSTOMER_API_TIMEOUT_MS or 120000.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// GET /health
    Health,
    /// List every customer.
    List,
    /// Fetch one customer.
    Get { id: i64 },
    /// Create a customer.
    Create(RecordArgs),
    /// Replace a customer's fields.
    Update {
        id: i64,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Delete a customer.
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct RecordArgs {
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    address: String,
}

impl RecordArgs {
    fn into_customer(self) -> Customer {
        let customer = Customer::new(self.first_name, self.last_name, self.address);
        if !customer.is_valid() {
            warn!("first name, last name and address should all be set; sending anyway");
        }
        customer
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the API call succeeded.
async fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms))?;
    }
    let transport = Transport::new(&config)?;

    let (title, endpoint, call) = match cli.command {
        Command::Health => ("HEALTH CHECK", "/health".to_string(), transport.health_check()),
        Command::List => ("FETCHING CUSTOMERS", "/api/customers".to_string(), transport.list_all()),
        Command::Get { id } => {
            let id = CustomerId::new(id)?;
            ("FETCHING CUSTOMER", format!("/api/customers/{id}"), transport.get_by_id(id))
        }
        Command::Create(record) => (
            "CREATING CUSTOMER",
            "/api/customers".to_string(),
            transport.create(&record.into_customer()),
        ),
        Command::Update { id, record } => {
            let id = CustomerId::new(id)?;
            (
                "UPDATING CUSTOMER",
                format!("/api/customers/{id}"),
                transport.update(id, &record.into_customer()),
            )
        }
        Command::Delete { id } => {
            let id = CustomerId::new(id)?;
            ("DELETING CUSTOMER", format!("/api/customers/{id}"), transport.delete(id))
        }
    };

    println!("=== {title} ===");
    println!("Sending request to: {}{endpoint}", transport.base_url());
    println!();

    let outcome = call.await;
    print!("{}", render::outcome(&outcome));
    Ok(outcome.is_ok())
}
