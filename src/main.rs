// src/main.rs

use serde_json::{Map, Value};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tron_http::{
    cli::{Cli, Commands, ConfigCommands},
    config::load_config,
    rotation::preview_key,
    AppError, ConnectionManager, ConnectionOverrides, Result,
};

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn parse_payload(raw: Option<&str>) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::configuration("Payload must be a JSON object")),
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Config {
            action: ConfigCommands::Validate,
        } => {
            let total_keys: usize = config
                .connections
                .values()
                .map(|c| c.candidate_keys().normalized().len())
                .sum();
            info!(
                config.connections.count = config.connections.len(),
                config.default = %config.default,
                config.total_keys = total_keys,
                "Configuration is valid"
            );
            println!(
                "Configuration OK: {} connections, default '{}'",
                config.connections.len(),
                config.default
            );
        }
        Commands::Status { connection } => {
            let manager = ConnectionManager::from_config(config)?;
            let conn = manager
                .make(connection.as_deref(), ConnectionOverrides::default())
                .await?;
            let status = conn.check_connections().await;
            let label = |up: bool| if up { "connected" } else { "disconnected" };
            println!("connection:    {}", conn.name);
            println!("full_node:     {}", label(status.full_node));
            println!("solidity_node: {}", label(status.solidity_node));
            println!("event_server:  {}", label(status.event_server));
        }
        Commands::Request {
            path,
            connection,
            method,
            payload,
            endpoint,
            api_key,
        } => {
            let payload = parse_payload(payload.as_deref())?;
            let manager = ConnectionManager::from_config(config)?;
            let overrides = ConnectionOverrides {
                api_key,
                ..ConnectionOverrides::default()
            };
            let conn = manager.make(connection.as_deref(), overrides).await?;
            let result = conn
                .dispatcher(endpoint.into())
                .dispatch(&path, payload, &method)
                .await?;
            println!("{}", serde_json::to_string_pretty(&Value::Object(result))?);
        }
        Commands::NextKey { connection } => {
            let manager = ConnectionManager::from_config(config)?;
            match manager.next_key(connection.as_deref(), None).await? {
                Some(key) => println!("{}", preview_key(&key)),
                None => println!("(no API key configured)"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.log("cli");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
