// src/config/loader.rs

use crate::config::{ConfigValidator, TronConfig};
use crate::error::{AppError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from file, falling back to built-in defaults, then
/// apply environment overrides and validate.
pub fn load_config(config_path: &Path) -> Result<TronConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        TronConfig::default()
    };

    override_with_env(&mut config);

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<TronConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::ConfigNotFound {
                path: config_path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        warn!("Config file '{}' is empty. Using defaults.", config_path.display());
        return Ok(TronConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
        message: format!("Failed to parse config file: {e}"),
        line: e.location().map(|loc| loc.line()),
    })
}

fn override_with_env(config: &mut TronConfig) {
    override_with(config, |name| std::env::var(name).ok());
}

/// Applies `TRON_*` / `REDIS_URL` overrides read through `lookup`.
pub(crate) fn override_with<F>(config: &mut TronConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(name) = lookup("TRON_DEFAULT") {
        info!("Overriding default connection from environment: {}", name);
        config.default = name.trim().to_string();
    }

    if let Some(redis_url) = lookup("REDIS_URL") {
        info!("Overriding Redis URL from environment variable");
        config.redis_url = Some(redis_url);
    }

    if let Some(timeout_str) = lookup("TRON_TIMEOUT_MS") {
        match timeout_str.trim().parse::<u64>() {
            Ok(timeout_ms) if timeout_ms > 0 => {
                info!("Overriding timeout from environment: {}ms", timeout_ms);
                for connection in config.connections.values_mut() {
                    connection.timeout_ms = timeout_ms;
                }
            }
            _ => warn!("Invalid TRON_TIMEOUT_MS environment variable: {}", timeout_str),
        }
    }

    if let Some(api_key) = lookup("TRON_API_KEY") {
        let mut applied = 0usize;
        for connection in config.connections.values_mut() {
            if !connection.has_keys() {
                connection.api_key = Some(api_key.clone());
                applied += 1;
            }
        }
        info!(connections = applied, "Applied TRON_API_KEY from environment");
    }

    let default_name = config.default.clone();
    if let Some(connection) = config.connections.get_mut(&default_name) {
        let endpoints = &mut connection.endpoints;
        for (var, slot) in [
            ("TRON_FULLNODE", &mut endpoints.full_node),
            ("TRON_SOLIDITY_NODE", &mut endpoints.solidity_node),
            ("TRON_EVENT_SERVER", &mut endpoints.event_server),
        ] {
            if let Some(host) = lookup(var) {
                info!(connection = %default_name, "Overriding endpoint from {}", var);
                *slot = host.trim().to_string();
            }
        }
    }
}
