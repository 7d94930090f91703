use crate::manager::Endpoint;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tron-http",
    version,
    about = "HTTP access layer for TRON node APIs with API key rotation",
    long_about = "Talks to TRON full node, solidity node and event server APIs, rotating \
                  TRON-PRO-API-KEY values round-robin with a cursor persisted in memory or Redis."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "TRON_HTTP_CONFIG", default_value = "tron.yaml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "TRON_HTTP_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every service of a connection
    Status {
        /// Connection name (defaults to the configured default)
        #[arg(short, long)]
        connection: Option<String>,
    },

    /// Send one request and print the normalized result
    Request {
        /// Path on the remote API, e.g. /wallet/getnowblock
        path: String,

        #[arg(short, long)]
        connection: Option<String>,

        /// GET or POST
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// JSON object sent as query parameters (GET) or body (POST)
        #[arg(short, long)]
        payload: Option<String>,

        #[arg(short, long, value_enum, default_value_t = EndpointArg::FullNode)]
        endpoint: EndpointArg,

        /// Use this key instead of rotating
        #[arg(long, env = "TRON_HTTP_API_KEY_OVERRIDE")]
        api_key: Option<String>,
    },

    /// Rotate once and print which key was selected
    NextKey {
        #[arg(short, long)]
        connection: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Load and validate the configuration file
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointArg {
    FullNode,
    SolidityNode,
    EventServer,
}

impl From<EndpointArg> for Endpoint {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::FullNode => Endpoint::FullNode,
            EndpointArg::SolidityNode => Endpoint::SolidityNode,
            EndpointArg::EventServer => Endpoint::EventServer,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
