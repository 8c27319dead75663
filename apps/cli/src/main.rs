//! keyturn: run one access-key rotation step

mod backends;
mod cli;
mod config;

use anyhow::Context as _;
use clap::Parser;
use keyturn_rotation::{Operation, RotationRequest, RotationResponse};
use std::io::Read as _;
use std::process::ExitCode;
use tracing::{debug, error, warn};

use crate::backends::Runtime;
use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("keyturn: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log = keyturn_log::init_with(config.log.clone()).unwrap_or_else(|err| {
        eprintln!("keyturn: {err}");
        keyturn_log::LoggerGuard::noop()
    });

    match run(cli, &config).await {
        Ok(response) => {
            println!("{}", serde_json::json!({ "status": response.status }));
            if response.status == 200 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!(error = format!("{err:#}"), "keyturn failed");
            eprintln!("keyturn: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<RotationResponse> {
    let runtime = Runtime::connect(&config.rotation, cli.dry_run).await?;
    debug!(dry_run = runtime.is_dry_run(), "Backends ready");

    let response = match cli.command {
        Command::Handle { event } => {
            let event = read_event(&event)?;
            if let Some(username) = event.get("username").and_then(|v| v.as_str()) {
                runtime.admit(username);
            }
            runtime.dispatcher.handle_event(event).await
        }
        Command::Create { username } => shorthand(&runtime, Operation::Create, username).await,
        Command::Deactivate { username } => {
            shorthand(&runtime, Operation::Deactivate, username).await
        }
        Command::Delete { username } => shorthand(&runtime, Operation::Delete, username).await,
    };

    Ok(response)
}

async fn shorthand(runtime: &Runtime, operation: Operation, username: String) -> RotationResponse {
    runtime.admit(&username);
    runtime
        .dispatcher
        .dispatch(&RotationRequest::new(operation, username))
        .await
}

/// Read a request; text that is not JSON becomes `null` and is refused downstream
fn read_event(source: &str) -> anyhow::Result<serde_json::Value> {
    let raw = if source == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read request from stdin")?;
        raw
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read request from {source}"))?
    };

    Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(error = %err, "Request is not valid JSON");
        serde_json::Value::Null
    }))
}
