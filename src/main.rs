//! UptimeRobot CLI - issue one UptimeRobot v2 API call
//!
//! Prints the decoded response envelope as pretty JSON on stdout. Errors go
//! to stderr with a non-zero exit status.

use std::process::ExitCode;

use clap::Parser;

use uptimerobot_client::api::ApiClient;
use uptimerobot_client::cli::Cli;
use uptimerobot_client::logging::init_logging;

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let client = ApiClient::from_config(cli.to_config())?;

    let envelope = if cli.cached {
        client.call_cachable(&cli.endpoint, &cli.params).await?
    } else {
        client.call(&cli.endpoint, &cli.params).await?
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
