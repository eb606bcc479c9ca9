use anyhow::{bail, Context};
use clap::Parser;
use proofy_core::{ClientConfig, ProofyClient, UreqTransport};
use tracing_subscriber::EnvFilter;

/// Check one email address with the Proofy API and print the result.
#[derive(Parser, Debug)]
#[command(name = "proofy-demo", version, about)]
struct Cli {
    /// Address to verify
    email: String,

    /// Your Proofy user ID
    #[arg(long)]
    aid: String,

    /// Your Proofy API key
    #[arg(long)]
    key: String,

    /// API base URL (point at the mock server for local runs)
    #[arg(long, default_value = proofy_core::config::DEFAULT_API_URL)]
    base_url: String,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Print the last request and raw response after the call
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig {
        base_url: cli.base_url,
        verify_ssl: !cli.insecure,
        ..ClientConfig::default()
    };
    let mut client = ProofyClient::with_config(cli.aid, cli.key, config, UreqTransport);

    let outcome = client.verify(&cli.email);

    if cli.verbose {
        if let Some(req) = client.last_request() {
            eprintln!("request:  {}", req.url);
        }
        eprintln!("response: {}", client.last_response().body);
    }

    let result = outcome.with_context(|| {
        format!(
            "verification of {} did not complete: {}",
            cli.email,
            client.last_error().unwrap_or("no error recorded")
        )
    })?;

    if !client.success() {
        bail!(
            "{}",
            client.last_error().unwrap_or(proofy_core::UNKNOWN_ERROR)
        );
    }

    match result {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("(empty response)"),
    }
    Ok(())
}
