//! `payrail`: send requests to the payment API and preview form encodings.
//!
//! # Usage
//!
//! ```bash
//! # Create a webhook endpoint
//! payrail request POST webhook_endpoints \
//!     -d url=https://example.com/hook \
//!     -d 'enabled_events[]=charge.failed' \
//!     --idempotency-key order-6735
//!
//! # Fetch a plan with its product expanded
//! payrail request GET plans/gold -d 'expand[]=product'
//!
//! # Show what a parameter set encodes to, without sending anything
//! payrail encode -d 'metadata[order_id]=6735' -d 'items[]=a' -d 'items[]=b'
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first.
//!
//! - `PAYRAIL_SECRET_KEY` - Secret API key (required for `request`)
//! - `PAYRAIL_API_BASE` - API origin (default: `https://api.stripe.com`)
//! - `PAYRAIL_API_VERSION` - Version pin sent as `Stripe-Version`
//! - `PAYRAIL_TIMEOUT_SECS` - Per-request timeout
//! - `RUST_LOG` - Log level filter (default: `info`)

mod cli;

use clap::Parser;
use payrail_http::{ApiHandler, DispatchError};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    // Missing .env is fine; flags and the process environment still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("payrail failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Encode(params) => {
            let encoded = ApiHandler::encode(&params.to_tree()?)?;
            println!("{encoded}");
        }
        Command::Request(args) => {
            let config = cli.connection.to_config()?;
            let handler = ApiHandler::try_new(&config)?;
            let descriptor = args.to_descriptor()?;
            tracing::debug!(method = %descriptor.method, path = %descriptor.path, "Sending request");

            match handler.execute::<serde_json::Value>(descriptor).await {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(DispatchError::Api { status, error }) => {
                    println!("{}", serde_json::to_string_pretty(&error)?);
                    return Err(format!("request rejected with HTTP {status}").into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
